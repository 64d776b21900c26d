//! Destination adapters
//!
//! One adapter per destination kind. Every adapter:
//! - validates its per-kind configuration from the persisted state,
//! - derives its [`SyncStatus`] from the persisted id and the member count,
//! - builds its payload from the audience's [`MemberSet`],
//! - uploads through a [`DestinationTransport`] only while `NotPosted`,
//! - snapshots its state for persistence.
//!
//! The snapshot carries the id assigned by a successful upload, so the next
//! run reconstructs the adapter as `Posted`. Within the current run the
//! status is left untouched.

pub mod adtech_a;
pub mod adtech_b;
pub mod payload;
pub mod status;

use crate::adapters::destination::{DestinationTransport, TransportResponse};
use crate::core::audience::state::{AdtechAState, AdtechBState};
use crate::core::members::MemberSet;
use crate::domain::response::is_success_status;
use crate::domain::{DestinationError, DestinationKind, LastResponse, TransportError};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};

pub use adtech_a::{AdtechA, AudienceType};
pub use adtech_b::{AdtechB, ExpirationTime};
pub use payload::prune_empty;
pub use status::SyncStatus;

/// Snapshot of one destination, ready to be placed in the state document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationState {
    AdtechA(AdtechAState),
    AdtechB(AdtechBState),
}

/// State shared by every destination kind
#[derive(Debug, Clone)]
pub struct DestinationCore {
    kind: DestinationKind,
    name: String,
    description: String,
    assigned_id: Option<String>,
    status: SyncStatus,
    last_response: LastResponse,
    uploaded_id: Option<String>,
}

impl DestinationCore {
    /// Creates the shared state and derives the status
    ///
    /// A blank persisted id counts as absent.
    pub fn new(
        kind: DestinationKind,
        name: impl Into<String>,
        description: impl Into<String>,
        assigned_id: Option<String>,
        last_response: LastResponse,
        record_count: usize,
    ) -> Self {
        let assigned_id = assigned_id.filter(|id| !id.trim().is_empty());
        let status = SyncStatus::derive(assigned_id.as_deref(), record_count);
        Self {
            kind,
            name: name.into(),
            description: description.into(),
            assigned_id,
            status,
            last_response,
            uploaded_id: None,
        }
    }

    pub fn kind(&self) -> DestinationKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn last_response(&self) -> &LastResponse {
        &self.last_response
    }

    /// Id persisted before this run
    pub fn assigned_id(&self) -> Option<&str> {
        self.assigned_id.as_deref()
    }

    /// Id captured from an upload during this run
    pub fn uploaded_id(&self) -> Option<&str> {
        self.uploaded_id.as_deref()
    }

    /// Id to persist: the one captured from this run's upload, else the loaded one
    pub fn snapshot_id(&self) -> Option<String> {
        self.uploaded_id.clone().or_else(|| self.assigned_id.clone())
    }

    /// Records the outcome of one transport call
    fn record(
        &mut self,
        outcome: std::result::Result<TransportResponse, TransportError>,
    ) -> LastResponse {
        let response = match outcome {
            Ok(response) => {
                if is_success_status(response.status) {
                    match response.id.filter(|id| !id.trim().is_empty()) {
                        Some(id) => self.uploaded_id = Some(id),
                        None => tracing::warn!(
                            destination = %self.kind,
                            audience = %self.name,
                            "Successful upload returned no id; destination stays unposted"
                        ),
                    }
                }
                LastResponse::received(response.date, response.status, response.message)
            }
            Err(e) => LastResponse::failed(Utc::now().date_naive(), e.to_string()),
        };

        self.last_response = response.clone();
        response
    }
}

/// Common interface of all destination kinds
#[async_trait]
pub trait Destination: Send + Sync {
    fn core(&self) -> &DestinationCore;

    fn core_mut(&mut self) -> &mut DestinationCore;

    /// Kind-specific top-level payload fields (type, expiration, ...)
    fn settings_fields(&self) -> Map<String, Value>;

    /// Kind-specific member fields (data, schema, ...)
    fn member_fields(&self, members: &MemberSet) -> Map<String, Value>;

    /// Snapshot of this destination for the next run
    fn snapshot(&self) -> DestinationState;

    fn kind(&self) -> DestinationKind {
        self.core().kind()
    }

    fn status(&self) -> SyncStatus {
        self.core().status()
    }

    fn last_response(&self) -> &LastResponse {
        self.core().last_response()
    }

    /// Builds the upload payload with empty entries pruned
    fn build_payload(&self, members: &MemberSet) -> Value {
        let core = self.core();
        let mut payload = Map::new();
        payload.insert("name".to_string(), Value::String(core.name().to_string()));
        payload.insert(
            "description".to_string(),
            Value::String(core.description().to_string()),
        );
        payload.extend(self.settings_fields());
        payload.extend(self.member_fields(members));
        prune_empty(Value::Object(payload))
    }

    /// Uploads a payload
    ///
    /// Fails fast, without calling the transport, unless the status is
    /// `NotPosted`. Transport failures and error statuses are recorded as the
    /// last response and returned as `Ok`.
    async fn upload(
        &mut self,
        transport: &dyn DestinationTransport,
        payload: &Value,
    ) -> std::result::Result<LastResponse, DestinationError> {
        let status = self.status();
        if status != SyncStatus::NotPosted {
            return Err(DestinationError::UploadNotAllowed {
                kind: self.kind(),
                status: status.to_string(),
            });
        }

        let outcome = transport.post(payload).await;
        Ok(self.core_mut().record(outcome))
    }
}
