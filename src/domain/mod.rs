//! Domain models and types for DMP Sync.
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`AudienceName`], [`DestinationKind`])
//! - **Last-response records** shared by the data source and destinations ([`LastResponse`])
//! - **Error types** ([`DmpError`], [`StorageError`], [`SourceError`], [`DestinationError`],
//!   [`TransportError`], [`EncodingError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible orchestration operations return [`Result<T, DmpError>`]:
//!
//! ```rust
//! use dmp_sync::domain::{AudienceName, DmpError, Result};
//!
//! fn parse(name: &str) -> Result<AudienceName> {
//!     AudienceName::new(name).map_err(DmpError::Validation)
//! }
//! # assert!(parse("Sample").is_ok());
//! ```

pub mod errors;
pub mod ids;
pub mod response;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{
    DestinationError, DmpError, EncodingError, SourceError, StorageError, TransportError,
};
pub use ids::{AudienceName, DestinationKind};
pub use response::LastResponse;
pub use result::Result;
