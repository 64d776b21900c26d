//! Destination transports
//!
//! A transport accepts a fully built payload and reports what the
//! advertising platform answered. Non-2xx answers are regular responses;
//! only failures where nothing was received are errors.

pub mod http;

use crate::config::DestinationsConfig;
use crate::domain::{DestinationKind, Result, TransportError};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub use http::HttpTransport;

/// Answer from a destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// Identifier assigned by the destination, when it returned one
    pub id: Option<String>,

    /// UTC calendar date of the response
    pub date: NaiveDate,

    /// HTTP status code
    pub status: u16,

    pub message: String,
}

/// Uploads audience payloads to one destination
#[async_trait]
pub trait DestinationTransport: Send + Sync {
    /// Posts a payload
    async fn post(&self, payload: &Value) -> std::result::Result<TransportResponse, TransportError>;
}

/// Bounds a transport call with a timeout
///
/// A timed-out call resolves to [`TransportError::Timeout`] for that call only.
pub struct TimedTransport<'a> {
    inner: &'a dyn DestinationTransport,
    timeout: Option<Duration>,
}

impl<'a> TimedTransport<'a> {
    pub fn new(inner: &'a dyn DestinationTransport, timeout: Option<Duration>) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl DestinationTransport for TimedTransport<'_> {
    async fn post(&self, payload: &Value) -> std::result::Result<TransportResponse, TransportError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.inner.post(payload))
                .await
                .map_err(|_| TransportError::Timeout(limit))?,
            None => self.inner.post(payload).await,
        }
    }
}

/// Transports keyed by destination kind
#[derive(Clone, Default)]
pub struct TransportRegistry {
    transports: HashMap<DestinationKind, Arc<dyn DestinationTransport>>,
}

impl TransportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transport, replacing any previous one for the kind
    pub fn insert(&mut self, kind: DestinationKind, transport: Arc<dyn DestinationTransport>) {
        self.transports.insert(kind, transport);
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, kind: DestinationKind, transport: Arc<dyn DestinationTransport>) -> Self {
        self.insert(kind, transport);
        self
    }

    pub fn get(&self, kind: DestinationKind) -> Option<&Arc<dyn DestinationTransport>> {
        self.transports.get(&kind)
    }

    pub fn kinds(&self) -> Vec<DestinationKind> {
        let mut kinds: Vec<_> = self.transports.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }
}

/// Builds HTTP transports for every enabled destination in the configuration
pub fn create_transports(config: &DestinationsConfig) -> Result<TransportRegistry> {
    let mut registry = TransportRegistry::new();

    for kind in DestinationKind::ALL {
        let Some(destination) = config.get(kind) else {
            continue;
        };
        if !destination.enabled {
            tracing::info!(destination = %kind, "Destination disabled in configuration");
            continue;
        }
        registry.insert(kind, Arc::new(HttpTransport::new(kind, destination)?));
    }

    Ok(registry)
}
