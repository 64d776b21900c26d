//! API gateway data source client
//!
//! Issues a GET to the audience endpoint with its parameters encoded in the
//! query string. Scalar parameters are sent as-is; lists become repeated keys.

use super::{SourceClient, SourceResponse};
use crate::config::{SecretString, SourceConfig};
use crate::domain::{DmpError, Result, SourceError};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// HTTP client for gateway-hosted audience exports
pub struct GatewayClient {
    client: Client,
    api_key: Option<SecretString>,
    api_key_header: String,
}

impl GatewayClient {
    /// Creates a new gateway client
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DmpError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_key_header: config.api_key_header.clone(),
        })
    }
}

/// Builds the request URL with parameters appended to any existing query
pub(crate) fn request_url(
    endpoint: &str,
    params: &BTreeMap<String, Value>,
) -> std::result::Result<Url, SourceError> {
    let mut url =
        Url::parse(endpoint).map_err(|_| SourceError::InvalidEndpoint(endpoint.to_string()))?;

    if !params.is_empty() {
        let mut query = url.query_pairs_mut();
        for (key, value) in params {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items {
                        query.append_pair(key, &param_text(item));
                    }
                }
                other => {
                    query.append_pair(key, &param_text(other));
                }
            }
        }
    }

    Ok(url)
}

fn param_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SourceClient for GatewayClient {
    async fn fetch(
        &self,
        endpoint: &str,
        params: &BTreeMap<String, Value>,
    ) -> std::result::Result<SourceResponse, SourceError> {
        let url = request_url(endpoint, params)?;

        let mut request = self.client.get(url);
        if let Some(api_key) = &self.api_key {
            request = request.header(self.api_key_header.as_str(), api_key.expose_secret().as_str());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout(e.to_string())
            } else {
                SourceError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status();
        let date = Utc::now().date_naive();
        let body = response
            .bytes()
            .await
            .map_err(|e| SourceError::ConnectionFailed(format!("failed to read body: {e}")))?
            .to_vec();

        let message = if status.is_success() {
            status.canonical_reason().unwrap_or("OK").to_string()
        } else {
            let text = String::from_utf8_lossy(&body);
            let text = text.trim();
            if text.is_empty() {
                status.to_string()
            } else {
                text.chars().take(512).collect()
            }
        };

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "Data source responded");

        Ok(SourceResponse {
            body,
            date,
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn test_request_url_encodes_params() {
        let params = BTreeMap::from([
            ("limit".to_string(), json!(1000)),
            ("segment".to_string(), json!("sample")),
            ("tags".to_string(), json!(["a", "b"])),
            ("unused".to_string(), Value::Null),
        ]);
        let url = request_url("https://gateway.example.com/audiences?v=2", &params).unwrap();
        assert_eq!(
            url.as_str(),
            "https://gateway.example.com/audiences?v=2&limit=1000&segment=sample&tags=a&tags=b"
        );
    }

    #[test]
    fn test_request_url_rejects_relative_endpoint() {
        let result = request_url("audiences/sample", &BTreeMap::new());
        assert!(matches!(result, Err(SourceError::InvalidEndpoint(_))));
    }

    #[tokio::test]
    async fn test_fetch_sends_api_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/audiences/sample")
            .match_query(Matcher::UrlEncoded("segment".into(), "sample".into()))
            .match_header("x-api-key", "key-1")
            .with_status(200)
            .with_body(vec![1u8, 2, 3])
            .create_async()
            .await;

        let config = SourceConfig {
            api_key: Some(secret_string("key-1".to_string())),
            ..Default::default()
        };
        let client = GatewayClient::new(&config).unwrap();
        let params = BTreeMap::from([("segment".to_string(), json!("sample"))]);
        let response = client
            .fetch(&format!("{}/audiences/sample", server.url()), &params)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_a_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/audiences/gone")
            .with_status(404)
            .with_body("no such audience")
            .create_async()
            .await;

        let client = GatewayClient::new(&SourceConfig::default()).unwrap();
        let response = client
            .fetch(&format!("{}/audiences/gone", server.url()), &BTreeMap::new())
            .await
            .unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.message, "no such audience");
    }
}
