//! Data source clients
//!
//! A source client produces the raw member data blob of one audience from
//! its endpoint and query parameters.

pub mod gateway;

use crate::config::SourceConfig;
use crate::domain::{Result, SourceError};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

pub use gateway::GatewayClient;

/// Response of a data source fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceResponse {
    pub body: Vec<u8>,

    /// UTC calendar date of the response
    pub date: NaiveDate,

    pub status: u16,

    pub message: String,
}

/// Fetches raw audience data
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Requests the audience data at `endpoint`
    ///
    /// Non-2xx statuses are returned as responses; errors are reserved for
    /// requests that produced no response.
    async fn fetch(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, Value>,
    ) -> std::result::Result<SourceResponse, SourceError>;
}

/// Creates the HTTP gateway client described by configuration
pub fn create_source_client(config: &SourceConfig) -> Result<Arc<dyn SourceClient>> {
    Ok(Arc::new(GatewayClient::new(config)?))
}
