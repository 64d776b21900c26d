//! Domain error types
//!
//! This module defines the error hierarchy for DMP Sync. Every collaborator
//! (object store, data source, destination transport, encoders) gets its own
//! error enum; [`DmpError`] wraps them for the orchestration layers.
//! None of these types expose third-party error types.

use crate::domain::ids::DestinationKind;
use thiserror::Error;

/// Main DMP Sync error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum DmpError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Object store errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Data source errors
    #[error("Data source error: {0}")]
    Source(#[from] SourceError),

    /// Destination adapter errors
    #[error("Destination error: {0}")]
    Destination(#[from] DestinationError),

    /// State or member data encoding errors
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Object store errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Key is not addressable by the backend
    #[error("Invalid object key '{0}'")]
    InvalidKey(String),

    /// Failed to read an object
    #[error("Failed to read '{key}': {message}")]
    ReadFailed { key: String, message: String },

    /// Failed to write an object
    #[error("Failed to write '{key}': {message}")]
    WriteFailed { key: String, message: String },

    /// Failed to list a prefix
    #[error("Failed to list '{prefix}': {message}")]
    ListFailed { prefix: String, message: String },
}

/// Data source errors
///
/// Raised while producing raw audience bytes. A source failure skips the
/// audience for the current run.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Endpoint could not be parsed
    #[error("Invalid source endpoint '{0}'")]
    InvalidEndpoint(String),

    /// Failed to reach the source
    #[error("Failed to connect to data source: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Data source request timeout: {0}")]
    Timeout(String),

    /// Source answered with a non-success status
    #[error("Data source request failed: {status} - {message}")]
    RequestFailed { status: u16, message: String },
}

/// Destination adapter errors
#[derive(Debug, Error)]
pub enum DestinationError {
    /// Per-kind configuration in the persisted state is invalid
    #[error("Invalid {kind} configuration for '{field}': {reason}")]
    InvalidConfig {
        kind: DestinationKind,
        field: String,
        reason: String,
    },

    /// Upload was requested while the adapter is not eligible
    #[error("Upload to {kind} not allowed while status is {status}")]
    UploadNotAllowed { kind: DestinationKind, status: String },
}

/// Destination transport errors
///
/// Only failures where no HTTP response was received. Non-2xx responses are
/// reported as regular responses carrying their status code.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Failed to reach the destination
    #[error("Failed to connect to destination: {0}")]
    ConnectionFailed(String),

    /// Upload timed out
    #[error("Upload timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Response body could not be interpreted
    #[error("Invalid response from destination: {0}")]
    InvalidResponse(String),
}

/// Encoding errors for state documents and member data blobs
#[derive(Debug, Error)]
pub enum EncodingError {
    /// State document could not be decoded
    #[error("Failed to decode state document: {0}")]
    StateDecode(String),

    /// State document could not be encoded
    #[error("Failed to encode state document: {0}")]
    StateEncode(String),

    /// Member data blob could not be decoded
    #[error("Failed to decode member data: {0}")]
    MemberDecode(String),

    /// Member data blob could not be encoded
    #[error("Failed to encode member data: {0}")]
    MemberEncode(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for DmpError {
    fn from(err: std::io::Error) -> Self {
        DmpError::Io(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for DmpError {
    fn from(err: toml::de::Error) -> Self {
        DmpError::Configuration(format!("TOML parse error: {err}"))
    }
}
