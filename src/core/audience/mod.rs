//! Audiences
//!
//! An [`Audience`] owns everything one sync needs: its member data, the
//! normalized [`MemberSet`] built from it, and one adapter per configured
//! destination. A sync evaluates every adapter, uploads concurrently to the
//! ones that are eligible, and leaves the outcome in the adapters so that
//! [`Audience::snapshot`] can hand the next run its state.

pub mod source;
pub mod state;

use crate::adapters::destination::{TimedTransport, TransportRegistry};
use crate::config::DmpConfig;
use crate::core::destination::{AdtechA, AdtechB, Destination, DestinationState, SyncStatus};
use crate::core::members::MemberSet;
use crate::domain::ids::{AudienceName, DestinationKind};
use crate::domain::Result;
use futures::future::join_all;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

pub use source::AudienceSource;
pub use state::{
    AdtechAState, AdtechBState, AudienceDocument, AudienceState, IntegerSetting, SourceState,
};

/// Options applied to every destination of one sync
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Build payloads without uploading
    pub dry_run: bool,

    /// Limit for a single upload call
    pub upload_timeout: Option<Duration>,

    /// Upload calls per destination, at least one
    pub upload_attempts: u32,

    /// Wait before the first retry; doubled for every further retry
    pub retry_delay: Duration,
}

impl SyncOptions {
    pub fn from_config(config: &DmpConfig) -> Self {
        Self {
            dry_run: config.application.dry_run,
            upload_timeout: Some(Duration::from_secs(config.sync.upload_timeout_seconds)),
            upload_attempts: config.sync.upload_attempts,
            retry_delay: Duration::from_millis(config.sync.retry_delay_ms),
        }
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            upload_timeout: None,
            upload_attempts: 1,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// What happened to one destination during a sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The destination accepted the audience and assigned an id
    Uploaded { status: u16 },

    /// Every attempt failed; `status` is absent when nothing was received
    Failed {
        status: Option<u16>,
        message: String,
    },

    SkippedPosted,

    SkippedNotFetched,

    /// No transport is configured for the destination kind
    SkippedNoTransport,

    /// Payload built for `records` members, nothing sent
    DryRun { records: usize },
}

impl UploadOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, UploadOutcome::Failed { .. })
    }

    pub fn is_upload(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded { .. })
    }

    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            UploadOutcome::SkippedPosted
                | UploadOutcome::SkippedNotFetched
                | UploadOutcome::SkippedNoTransport
        )
    }
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadOutcome::Uploaded { status } => write!(f, "uploaded ({status})"),
            UploadOutcome::Failed {
                status: Some(status),
                message,
            } => write!(f, "failed ({status}): {message}"),
            UploadOutcome::Failed {
                status: None,
                message,
            } => write!(f, "failed: {message}"),
            UploadOutcome::SkippedPosted => f.write_str("skipped, already posted"),
            UploadOutcome::SkippedNotFetched => f.write_str("skipped, no member data"),
            UploadOutcome::SkippedNoTransport => f.write_str("skipped, destination not configured"),
            UploadOutcome::DryRun { records } => write!(f, "dry run, {records} records"),
        }
    }
}

/// Outcome for one destination kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationOutcome {
    pub kind: DestinationKind,
    pub outcome: UploadOutcome,
}

/// A named audience with its members and destination adapters
pub struct Audience {
    name: AudienceName,
    description: String,
    source: AudienceSource,
    data: Vec<u8>,
    members: MemberSet,
    destinations: Vec<Box<dyn Destination>>,
}

impl Audience {
    /// Builds an audience from its state document and member data
    ///
    /// `source` carries the outcome of any fetch made for `data`; the
    /// document's own source record is not consulted.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be decoded or a destination's
    /// configuration is invalid.
    pub fn new(document: AudienceDocument, source: AudienceSource, data: Vec<u8>) -> Result<Self> {
        let AudienceDocument { name, state } = document;
        let members = MemberSet::decode(&data)?;
        let record_count = members.len();

        let mut destinations: Vec<Box<dyn Destination>> = Vec::new();
        if let Some(adtech_a) = &state.adtech_a {
            destinations.push(Box::new(AdtechA::new(
                name.as_str(),
                &state.description,
                adtech_a,
                record_count,
            )?));
        }
        if let Some(adtech_b) = &state.adtech_b {
            destinations.push(Box::new(AdtechB::new(
                name.as_str(),
                &state.description,
                adtech_b,
                record_count,
            )?));
        }

        Ok(Self {
            name,
            description: state.description,
            source,
            data,
            members,
            destinations,
        })
    }

    pub fn name(&self) -> &AudienceName {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn source(&self) -> &AudienceSource {
        &self.source
    }

    /// Raw member data the audience was built from
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn members(&self) -> &MemberSet {
        &self.members
    }

    pub fn destinations(&self) -> impl Iterator<Item = &dyn Destination> {
        self.destinations.iter().map(|d| d.as_ref() as &dyn Destination)
    }

    pub fn destination(&self, kind: DestinationKind) -> Option<&dyn Destination> {
        self.destinations().find(|d| d.kind() == kind)
    }

    /// Evaluates and uploads every destination
    ///
    /// Uploads run concurrently and are all joined before this returns, so a
    /// following [`snapshot`](Self::snapshot) sees every outcome.
    pub async fn sync(
        &mut self,
        transports: &TransportRegistry,
        options: &SyncOptions,
    ) -> Vec<DestinationOutcome> {
        let name = &self.name;
        let members = &self.members;

        let uploads = self.destinations.iter_mut().map(|destination| {
            sync_destination(name, destination.as_mut(), members, transports, options)
        });

        join_all(uploads).await
    }

    /// State document to persist for the next run
    pub fn snapshot(&self) -> AudienceDocument {
        let mut state = AudienceState {
            description: self.description.clone(),
            source: self.source.snapshot(),
            adtech_a: None,
            adtech_b: None,
        };

        for destination in &self.destinations {
            match destination.snapshot() {
                DestinationState::AdtechA(snapshot) => state.adtech_a = Some(snapshot),
                DestinationState::AdtechB(snapshot) => state.adtech_b = Some(snapshot),
            }
        }

        AudienceDocument::new(self.name.clone(), state)
    }
}

impl fmt::Debug for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Audience")
            .field("name", &self.name)
            .field("records", &self.members.len())
            .field(
                "destinations",
                &self.destinations().map(|d| d.kind()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

async fn sync_destination(
    audience: &AudienceName,
    destination: &mut dyn Destination,
    members: &MemberSet,
    transports: &TransportRegistry,
    options: &SyncOptions,
) -> DestinationOutcome {
    let kind = destination.kind();

    let outcome = match destination.status() {
        SyncStatus::Posted => UploadOutcome::SkippedPosted,
        SyncStatus::NotFetched => UploadOutcome::SkippedNotFetched,
        SyncStatus::NotPosted => {
            let payload = destination.build_payload(members);
            if options.dry_run {
                UploadOutcome::DryRun {
                    records: members.len(),
                }
            } else {
                match transports.get(kind) {
                    Some(transport) => {
                        let transport = TimedTransport::new(transport.as_ref(), options.upload_timeout);
                        upload_with_attempts(audience, destination, &transport, &payload, options)
                            .await
                    }
                    None => UploadOutcome::SkippedNoTransport,
                }
            }
        }
    };

    crate::log_upload_outcome!(audience, kind, &outcome);

    DestinationOutcome { kind, outcome }
}

async fn upload_with_attempts(
    audience: &AudienceName,
    destination: &mut dyn Destination,
    transport: &TimedTransport<'_>,
    payload: &Value,
    options: &SyncOptions,
) -> UploadOutcome {
    let max_attempts = options.upload_attempts.max(1);
    let mut attempt = 1;

    loop {
        let response = match destination.upload(transport, payload).await {
            Ok(response) => response,
            Err(e) => {
                return UploadOutcome::Failed {
                    status: None,
                    message: e.to_string(),
                }
            }
        };

        if response.is_success() {
            let status = response.status.unwrap_or_default();
            return if destination.core().uploaded_id().is_some() {
                UploadOutcome::Uploaded { status }
            } else {
                UploadOutcome::Failed {
                    status: response.status,
                    message: "response carried no audience id".to_string(),
                }
            };
        }

        let message = response.message.unwrap_or_default();
        if attempt >= max_attempts {
            return UploadOutcome::Failed {
                status: response.status,
                message,
            };
        }

        let delay = backoff_delay(options.retry_delay, attempt);
        tracing::debug!(
            audience = %audience,
            destination = %destination.kind(),
            delay_ms = delay.as_millis() as u64,
            "Upload rejected"
        );
        crate::log_retry_attempt!(attempt, max_attempts, message.as_str());
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// Longest wait between two upload attempts
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Delay before the retry that follows `attempt`, doubling from `base`
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    2u32.checked_pow(attempt.saturating_sub(1))
        .and_then(|factor| base.checked_mul(factor))
        .map_or(MAX_RETRY_DELAY, |delay| delay.min(MAX_RETRY_DELAY))
}
