//! Shared test doubles for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use dmp_sync::adapters::destination::{DestinationTransport, TransportResponse};
use dmp_sync::adapters::encoding::{encode_rows, encode_state};
use dmp_sync::adapters::source::{SourceClient, SourceResponse};
use dmp_sync::adapters::storage::{MemoryObjectStore, ObjectStore};
use dmp_sync::core::audience::state::{AdtechAState, AdtechBState, AudienceState, SourceState};
use dmp_sync::core::audience::AudienceDocument;
use dmp_sync::core::catalog::KeyLayout;
use dmp_sync::core::members::RawMemberRow;
use dmp_sync::core::normalize::RawValue;
use dmp_sync::domain::{AudienceName, SourceError, TransportError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

/// Data source serving the same blob for every endpoint
pub struct FixedSource {
    body: Vec<u8>,
    calls: AtomicUsize,
}

impl FixedSource {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceClient for FixedSource {
    async fn fetch(
        &self,
        _endpoint: &str,
        _params: &BTreeMap<String, Value>,
    ) -> Result<SourceResponse, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SourceResponse {
            body: self.body.clone(),
            date: date(),
            status: 200,
            message: "OK".to_string(),
        })
    }
}

/// Destination double that records payloads and answers 200 with an id
pub struct CountingTransport {
    id: String,
    delay: Duration,
    payloads: Mutex<Vec<Value>>,
}

impl CountingTransport {
    pub fn new(id: &str) -> Self {
        Self::with_delay(id, Duration::ZERO)
    }

    pub fn with_delay(id: &str, delay: Duration) -> Self {
        Self {
            id: id.to_string(),
            delay,
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.payloads.lock().unwrap().len()
    }

    pub fn payloads(&self) -> Vec<Value> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl DestinationTransport for CountingTransport {
    async fn post(&self, payload: &Value) -> Result<TransportResponse, TransportError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.payloads.lock().unwrap().push(payload.clone());
        Ok(TransportResponse {
            id: Some(self.id.clone()),
            date: date(),
            status: 200,
            message: "Success".to_string(),
        })
    }
}

pub fn member_data(emails: &[&str]) -> Vec<u8> {
    let rows: Vec<RawMemberRow> = emails
        .iter()
        .map(|email| RawMemberRow {
            email: RawValue::from(*email),
            ..Default::default()
        })
        .collect();
    encode_rows(&rows).unwrap()
}

/// State document with both destinations configured and nothing uploaded
pub fn document(name: &str) -> AudienceDocument {
    AudienceDocument::new(
        AudienceName::new(name).unwrap(),
        AudienceState {
            description: format!("{name} audience"),
            source: SourceState {
                endpoint: format!("https://gateway.example.com/audiences/{name}"),
                ..Default::default()
            },
            adtech_a: Some(AdtechAState {
                audience_type: Some("TYPE_X".to_string()),
                ..Default::default()
            }),
            adtech_b: Some(AdtechBState::default()),
        },
    )
}

/// Memory store holding state documents (and no data) for the given audiences
pub async fn store_with(names: &[&str]) -> Arc<MemoryObjectStore> {
    let store = Arc::new(MemoryObjectStore::new());
    let layout = KeyLayout::default();
    for name in names {
        let document = document(name);
        store
            .put(&layout.state_key(&document.name), encode_state(&document).unwrap())
            .await
            .unwrap();
    }
    store
}
