//! HTTP destination transport
//!
//! Posts payloads to `{base_url}/{api_version}/audiences?advertiserId=...`
//! with a bearer token. The response body is expected to be JSON carrying the
//! assigned audience `id` and an optional `message`.

use super::{DestinationTransport, TransportResponse};
use crate::config::{DestinationConfig, SecretString};
use crate::domain::{DestinationKind, DmpError, Result, TransportError};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Longest response body excerpt kept as a failure message
const MAX_MESSAGE_LEN: usize = 512;

#[derive(Debug, Default, Deserialize)]
struct UploadResponseBody {
    #[serde(default)]
    id: Option<Value>,

    #[serde(default)]
    message: Option<String>,
}

/// Destination transport over HTTP
pub struct HttpTransport {
    kind: DestinationKind,
    client: Client,
    endpoint: Url,
    access_token: SecretString,
    timeout: Duration,
}

impl HttpTransport {
    /// Creates a transport for one destination
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the endpoint URL cannot be built or
    /// the HTTP client cannot be initialized.
    pub fn new(kind: DestinationKind, config: &DestinationConfig) -> Result<Self> {
        let endpoint = upload_endpoint(config).map_err(|e| {
            DmpError::Configuration(format!(
                "destinations.{}.base_url is invalid: {e}",
                kind.config_key()
            ))
        })?;

        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DmpError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            kind,
            client,
            endpoint,
            access_token: config.access_token.clone(),
            timeout,
        })
    }

    /// Upload URL, including the advertiser query parameter
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn upload_endpoint(config: &DestinationConfig) -> std::result::Result<Url, url::ParseError> {
    let raw = format!(
        "{}/{}/audiences",
        config.base_url.trim_end_matches('/'),
        config.api_version.trim_matches('/')
    );
    let mut url = Url::parse(&raw)?;
    url.query_pairs_mut()
        .append_pair("advertiserId", &config.advertiser_id);
    Ok(url)
}

fn truncate(text: &str) -> String {
    if text.len() <= MAX_MESSAGE_LEN {
        return text.to_string();
    }
    let mut end = MAX_MESSAGE_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[async_trait]
impl DestinationTransport for HttpTransport {
    async fn post(&self, payload: &Value) -> std::result::Result<TransportResponse, TransportError> {
        tracing::debug!(destination = %self.kind, endpoint = %self.endpoint.path(), "Posting audience payload");

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.access_token.expose_secret().as_str())
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout(self.timeout)
                } else {
                    TransportError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = response.status();
        let date = Utc::now().date_naive();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        let body: UploadResponseBody = serde_json::from_str(&text).unwrap_or_default();

        let id = body.id.and_then(|id| match id {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        let message = match body.message {
            Some(message) => message,
            None if status.is_success() => status
                .canonical_reason()
                .unwrap_or("Success")
                .to_string(),
            None if text.trim().is_empty() => status.to_string(),
            None => truncate(text.trim()),
        };

        if status.is_success() && id.is_none() {
            tracing::warn!(destination = %self.kind, status = status.as_u16(), "Upload accepted without an audience id");
        }

        Ok(TransportResponse {
            id,
            date,
            status: status.as_u16(),
            message,
        })
    }
}
