//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output for operators
//! - JSON-formatted log files with rotation
//! - Configurable log levels, overridable with `RUST_LOG`
//!
//! Member PII never reaches a log line; only names, counts and statuses do.
//!
//! # Example
//!
//! ```no_run
//! use dmp_sync::logging::init_logging;
//! use dmp_sync::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a sync run
///
/// # Example
///
/// ```no_run
/// use dmp_sync::log_sync_start;
///
/// let run_id = uuid::Uuid::new_v4();
/// log_sync_start!(run_id, false, 4);
/// ```
#[macro_export]
macro_rules! log_sync_start {
    ($run_id:expr, $dry_run:expr, $concurrency:expr) => {
        tracing::info!(
            run_id = %$run_id,
            dry_run = $dry_run,
            max_concurrency = $concurrency,
            "Starting sync"
        );
    };
}

/// Log the completion of one audience
///
/// # Example
///
/// ```no_run
/// use dmp_sync::log_audience_complete;
/// use std::time::Duration;
///
/// log_audience_complete!(1500usize, Duration::from_millis(420));
/// ```
#[macro_export]
macro_rules! log_audience_complete {
    ($records:expr, $duration:expr) => {
        tracing::info!(
            records = $records,
            duration_ms = $duration.as_millis(),
            "Audience synced"
        );
    };
}

/// Log what happened to one destination of an audience
///
/// Failures are logged at `warn`, everything else at `info`.
///
/// # Example
///
/// ```no_run
/// use dmp_sync::log_upload_outcome;
/// use dmp_sync::core::audience::UploadOutcome;
/// use dmp_sync::domain::DestinationKind;
///
/// let outcome = UploadOutcome::Uploaded { status: 200 };
/// log_upload_outcome!("Sample", DestinationKind::AdtechA, &outcome);
/// ```
#[macro_export]
macro_rules! log_upload_outcome {
    ($audience:expr, $destination:expr, $outcome:expr) => {{
        let outcome = $outcome;
        if outcome.is_failure() {
            tracing::warn!(
                audience = %$audience,
                destination = %$destination,
                outcome = %outcome,
                "Destination upload failed"
            );
        } else {
            tracing::info!(
                audience = %$audience,
                destination = %$destination,
                outcome = %outcome,
                "Destination processed"
            );
        }
    }};
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use dmp_sync::log_error_with_context;
/// use dmp_sync::domain::DmpError;
///
/// let error = DmpError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use dmp_sync::log_retry_attempt;
///
/// log_retry_attempt!(1, 3, "Service Unavailable");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = $reason,
            "Retrying operation"
        );
    };
}
