//! Object store abstraction
//!
//! State documents and member data blobs are opaque bytes addressed by
//! `/`-separated keys such as `state/Sample.yml`. Backends only need
//! whole-object reads and writes plus a flat listing under a prefix.

pub mod local;
pub mod memory;

use crate::config::{StorageBackend, StorageConfig};
use crate::domain::StorageError;
use async_trait::async_trait;
use std::sync::Arc;

pub use local::LocalObjectStore;
pub use memory::MemoryObjectStore;

/// Whole-object byte storage
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Reads an object; a missing key is `Ok(None)`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Writes an object, replacing any previous content
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError>;

    /// Lists the keys directly under a prefix, sorted
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

/// Rejects keys that could escape the store root
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('/')
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// Creates the object store selected in configuration
pub fn create_object_store(config: &StorageConfig) -> Arc<dyn ObjectStore> {
    match config.backend {
        StorageBackend::Local => {
            tracing::info!(root = %config.root, "Using local object store");
            Arc::new(LocalObjectStore::new(&config.root))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory object store; state will not be kept after this run");
            Arc::new(MemoryObjectStore::new())
        }
    }
}
