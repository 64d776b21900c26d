//! Sync summary and reporting
//!
//! This module defines structures for tracking and reporting sync results.

use crate::core::audience::{DestinationOutcome, UploadOutcome};
use crate::domain::ids::AudienceName;
use std::time::Duration;
use uuid::Uuid;

/// Result of processing one audience
#[derive(Debug, Clone)]
pub struct AudienceReport {
    pub name: AudienceName,

    /// Per-destination outcomes; empty when the audience could not be loaded
    pub outcomes: Vec<DestinationOutcome>,

    /// Load or persist failure
    pub error: Option<SyncError>,
}

impl AudienceReport {
    pub fn synced(name: AudienceName, outcomes: Vec<DestinationOutcome>) -> Self {
        Self {
            name,
            outcomes,
            error: None,
        }
    }

    pub fn failed(name: AudienceName, outcomes: Vec<DestinationOutcome>, error: SyncError) -> Self {
        Self {
            name,
            outcomes,
            error: Some(error),
        }
    }
}

/// Summary of a sync run
#[derive(Debug, Clone)]
pub struct SyncSummary {
    /// Identifier of the run, also attached to every log line of the run
    pub run_id: Uuid,

    pub dry_run: bool,

    /// Audiences that were started
    pub total_audiences: usize,

    /// Audiences loaded, synced and persisted without error
    pub synced_audiences: usize,

    /// Audiences skipped because of a load or persist failure
    pub failed_audiences: usize,

    /// Destinations that accepted an upload
    pub uploads_succeeded: usize,

    /// Destinations whose upload failed
    pub uploads_failed: usize,

    /// Destinations skipped as posted, unfetched or unconfigured
    pub uploads_skipped: usize,

    /// Payloads built without being sent
    pub dry_run_payloads: usize,

    /// True when a shutdown signal stopped the run early
    pub interrupted: bool,

    pub duration: Duration,

    pub audiences: Vec<AudienceReport>,

    pub errors: Vec<SyncError>,
}

impl SyncSummary {
    pub fn new(run_id: Uuid, dry_run: bool) -> Self {
        Self {
            run_id,
            dry_run,
            total_audiences: 0,
            synced_audiences: 0,
            failed_audiences: 0,
            uploads_succeeded: 0,
            uploads_failed: 0,
            uploads_skipped: 0,
            dry_run_payloads: 0,
            interrupted: false,
            duration: Duration::from_secs(0),
            audiences: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn add_error(&mut self, error: SyncError) {
        self.errors.push(error);
    }

    /// Folds one audience report into the counters
    pub fn record(&mut self, report: AudienceReport) {
        self.total_audiences += 1;

        for outcome in &report.outcomes {
            match &outcome.outcome {
                UploadOutcome::Uploaded { .. } => self.uploads_succeeded += 1,
                UploadOutcome::Failed { message, .. } => {
                    self.uploads_failed += 1;
                    self.add_error(
                        SyncError::new(SyncErrorType::Upload, message.clone()).with_context(
                            format!("audience={}, destination={}", report.name, outcome.kind),
                        ),
                    );
                }
                UploadOutcome::DryRun { .. } => self.dry_run_payloads += 1,
                UploadOutcome::SkippedPosted
                | UploadOutcome::SkippedNotFetched
                | UploadOutcome::SkippedNoTransport => self.uploads_skipped += 1,
            }
        }

        match &report.error {
            Some(error) => {
                self.failed_audiences += 1;
                self.add_error(error.clone());
            }
            None => self.synced_audiences += 1,
        }

        self.audiences.push(report);
    }

    /// Check if the sync was successful (no failures)
    pub fn is_successful(&self) -> bool {
        self.failed_audiences == 0 && self.uploads_failed == 0 && self.errors.is_empty()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            dry_run = self.dry_run,
            total_audiences = self.total_audiences,
            synced = self.synced_audiences,
            failed = self.failed_audiences,
            uploads_succeeded = self.uploads_succeeded,
            uploads_failed = self.uploads_failed,
            uploads_skipped = self.uploads_skipped,
            interrupted = self.interrupted,
            duration_secs = self.duration.as_secs(),
            "Sync completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(error_count = self.errors.len(), "Sync completed with errors");
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    message = %error.message,
                    context = error.context.as_deref().unwrap_or(""),
                    "Sync error"
                );
            }
        }
    }
}

/// Type of sync error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncErrorType {
    /// State or data could not be read or decoded
    Load,
    /// Member data could not be fetched from the source
    Fetch,
    /// A destination's configuration in the state document is invalid
    Configuration,
    /// A destination rejected or never answered the upload
    Upload,
    /// State or data could not be written
    Persist,
    /// Requested audience does not exist
    NotFound,
}

/// Sync error with context
#[derive(Debug, Clone)]
pub struct SyncError {
    pub error_type: SyncErrorType,

    pub message: String,

    /// Optional context (e.g., audience, destination)
    pub context: Option<String>,
}

impl SyncError {
    pub fn new(error_type: SyncErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
            context: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::DestinationKind;

    fn name() -> AudienceName {
        AudienceName::new("Sample").unwrap()
    }

    #[test]
    fn test_summary_creation() {
        let summary = SyncSummary::new(Uuid::new_v4(), false);

        assert_eq!(summary.total_audiences, 0);
        assert_eq!(summary.duration, Duration::from_secs(0));
        assert!(summary.errors.is_empty());
        assert!(summary.is_successful());
    }

    #[test]
    fn test_record_counts_outcomes() {
        let mut summary = SyncSummary::new(Uuid::new_v4(), false);
        summary.record(AudienceReport::synced(
            name(),
            vec![
                DestinationOutcome {
                    kind: DestinationKind::AdtechA,
                    outcome: UploadOutcome::Uploaded { status: 200 },
                },
                DestinationOutcome {
                    kind: DestinationKind::AdtechB,
                    outcome: UploadOutcome::SkippedPosted,
                },
            ],
        ));

        assert_eq!(summary.total_audiences, 1);
        assert_eq!(summary.synced_audiences, 1);
        assert_eq!(summary.uploads_succeeded, 1);
        assert_eq!(summary.uploads_skipped, 1);
        assert!(summary.is_successful());
    }

    #[test]
    fn test_failed_upload_recorded_as_error() {
        let mut summary = SyncSummary::new(Uuid::new_v4(), false);
        summary.record(AudienceReport::synced(
            name(),
            vec![DestinationOutcome {
                kind: DestinationKind::AdtechB,
                outcome: UploadOutcome::Failed {
                    status: Some(500),
                    message: "Internal Server Error".to_string(),
                },
            }],
        ));

        assert!(!summary.is_successful());
        assert_eq!(summary.uploads_failed, 1);
        assert_eq!(summary.errors[0].error_type, SyncErrorType::Upload);
        assert_eq!(
            summary.errors[0].context.as_deref(),
            Some("audience=Sample, destination=adtechB")
        );
    }

    #[test]
    fn test_failed_audience() {
        let mut summary = SyncSummary::new(Uuid::new_v4(), false);
        summary.record(AudienceReport::failed(
            name(),
            Vec::new(),
            SyncError::new(SyncErrorType::Fetch, "connection refused"),
        ));

        assert_eq!(summary.failed_audiences, 1);
        assert_eq!(summary.synced_audiences, 0);
        assert!(!summary.is_successful());
    }

    #[test]
    fn test_with_duration() {
        let summary = SyncSummary::new(Uuid::new_v4(), true).with_duration(Duration::from_secs(3));
        assert_eq!(summary.duration, Duration::from_secs(3));
        assert!(summary.dry_run);
    }
}
