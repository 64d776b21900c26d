//! External system integrations for DMP Sync.
//!
//! This module provides adapters for integrating with external systems:
//!
//! - [`storage`] - Object store for state documents and member data (local, in-memory)
//! - [`source`] - Data source client producing raw member data
//! - [`destination`] - Transports posting payloads to advertising platforms
//! - [`encoding`] - Byte formats of persisted blobs
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with in-process implementations. Every integration is a
//! trait held as `Arc<dyn Trait>`, so the core never names a concrete backend.
//!
//! # Object Store
//!
//! ```rust,no_run
//! use dmp_sync::adapters::storage::{LocalObjectStore, ObjectStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = LocalObjectStore::new("./dmp-data");
//! store.put("state/Sample.yml", b"Sample: {}".to_vec()).await?;
//! let names = store.list("state").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Destination Transport
//!
//! ```rust,no_run
//! use dmp_sync::adapters::destination::{DestinationTransport, HttpTransport};
//! use dmp_sync::config::{secret_string, DestinationConfig};
//! use dmp_sync::domain::DestinationKind;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DestinationConfig {
//!     enabled: true,
//!     base_url: "https://api.adtech-a.example.com".to_string(),
//!     api_version: "v1".to_string(),
//!     advertiser_id: "1234".to_string(),
//!     access_token: secret_string("token".to_string()),
//!     timeout_seconds: 60,
//! };
//!
//! let transport = HttpTransport::new(DestinationKind::AdtechA, &config)?;
//! let response = transport.post(&serde_json::json!({"name": "Sample"})).await?;
//! # Ok(())
//! # }
//! ```

pub mod destination;
pub mod encoding;
pub mod source;
pub mod storage;
