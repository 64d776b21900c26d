//! Sync orchestration
//!
//! This module runs the catalog over every pending audience:
//! - Bounded parallel processing of audiences
//! - Graceful stop on shutdown signals
//! - Summary and reporting

pub mod coordinator;
pub mod summary;

pub use coordinator::SyncCoordinator;
pub use summary::{AudienceReport, SyncError, SyncErrorType, SyncSummary};
