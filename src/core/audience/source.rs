//! Audience data source

use super::state::SourceState;
use crate::adapters::source::SourceClient;
use crate::domain::response::is_success_status;
use crate::domain::{LastResponse, SourceError};
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;

/// Where an audience's member data comes from, and how the last fetch went
#[derive(Debug, Clone, PartialEq)]
pub struct AudienceSource {
    endpoint: String,
    params: BTreeMap<String, Value>,
    last_response: LastResponse,
    fresh: bool,
}

impl AudienceSource {
    pub fn from_state(state: &SourceState) -> Self {
        Self {
            endpoint: state.endpoint.clone(),
            params: state.params.clone(),
            last_response: state.last_response.clone(),
            fresh: false,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn params(&self) -> &BTreeMap<String, Value> {
        &self.params
    }

    pub fn last_response(&self) -> &LastResponse {
        &self.last_response
    }

    /// True once data was fetched during this run
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Fetches the raw member data blob
    ///
    /// The outcome is recorded as the last response whether or not it
    /// succeeded.
    ///
    /// # Errors
    ///
    /// Returns an error if no endpoint is configured, the request fails, or
    /// the source answers with a non-2xx status.
    pub async fn fetch(&mut self, client: &dyn SourceClient) -> Result<Vec<u8>, SourceError> {
        if self.endpoint.trim().is_empty() {
            return Err(SourceError::InvalidEndpoint(self.endpoint.clone()));
        }

        let response = match client.fetch(&self.endpoint, &self.params).await {
            Ok(response) => response,
            Err(e) => {
                self.last_response = LastResponse::failed(Utc::now().date_naive(), e.to_string());
                return Err(e);
            }
        };

        self.last_response =
            LastResponse::received(response.date, response.status, response.message.clone());

        if !is_success_status(response.status) {
            return Err(SourceError::RequestFailed {
                status: response.status,
                message: response.message,
            });
        }

        self.fresh = true;
        Ok(response.body)
    }

    pub fn snapshot(&self) -> SourceState {
        SourceState {
            endpoint: self.endpoint.clone(),
            params: self.params.clone(),
            last_response: self.last_response.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::adapters::source::SourceResponse;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source double serving a fixed body with a fixed status
    pub struct StaticSource {
        pub body: Vec<u8>,
        pub status: u16,
        calls: AtomicUsize,
    }

    impl StaticSource {
        pub fn new(body: Vec<u8>, status: u16) -> Self {
            Self {
                body,
                status,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SourceClient for StaticSource {
        async fn fetch(
            &self,
            _endpoint: &str,
            _params: &BTreeMap<String, Value>,
        ) -> Result<SourceResponse, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SourceResponse {
                body: self.body.clone(),
                date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
                status: self.status,
                message: "ok".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StaticSource;
    use super::*;

    fn state() -> SourceState {
        SourceState {
            endpoint: "https://gateway.example.com/audiences/sample".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_marks_fresh() {
        let client = StaticSource::new(vec![9, 9], 200);
        let mut source = AudienceSource::from_state(&state());
        assert!(!source.is_fresh());

        let body = source.fetch(&client).await.unwrap();
        assert_eq!(body, vec![9, 9]);
        assert!(source.is_fresh());
        assert_eq!(source.last_response().status, Some(200));
        assert_eq!(source.snapshot().last_response, *source.last_response());
    }

    #[tokio::test]
    async fn test_fetch_error_status_recorded() {
        let client = StaticSource::new(Vec::new(), 503);
        let mut source = AudienceSource::from_state(&state());

        let err = source.fetch(&client).await.unwrap_err();
        assert!(matches!(err, SourceError::RequestFailed { status: 503, .. }));
        assert!(!source.is_fresh());
        assert_eq!(source.last_response().status, Some(503));
    }

    #[tokio::test]
    async fn test_fetch_without_endpoint() {
        let client = StaticSource::new(Vec::new(), 200);
        let mut source = AudienceSource::from_state(&SourceState::default());
        assert!(source.fetch(&client).await.is_err());
        assert_eq!(client.calls(), 0);
    }
}
