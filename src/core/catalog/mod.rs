//! Sync catalog
//!
//! The catalog owns the object store layout. It discovers audiences from the
//! state namespace, reconstructs them from their persisted blobs (fetching
//! member data when no blob exists) and writes them back after a sync.
//!
//! Persistence order matters: a freshly fetched data blob is written before
//! the state document, so a state document never refers to data that was not
//! stored.

pub mod layout;
pub mod status;

use crate::adapters::encoding::{decode_state, encode_state};
use crate::adapters::source::{create_source_client, SourceClient};
use crate::adapters::storage::{create_object_store, ObjectStore};
use crate::config::DmpConfig;
use crate::core::audience::{Audience, AudienceDocument, AudienceSource};
use crate::domain::ids::AudienceName;
use crate::domain::{DmpError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

pub use layout::KeyLayout;
pub use status::{AudienceStatus, DestinationStatus};

/// Entry point for loading and persisting audiences
pub struct SyncCatalog {
    store: Arc<dyn ObjectStore>,
    source_client: Arc<dyn SourceClient>,
    layout: KeyLayout,
    seeds: BTreeMap<AudienceName, AudienceDocument>,
}

impl SyncCatalog {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        source_client: Arc<dyn SourceClient>,
        layout: KeyLayout,
    ) -> Self {
        Self {
            store,
            source_client,
            layout,
            seeds: BTreeMap::new(),
        }
    }

    /// Adds documents to use for audiences that have no persisted state
    pub fn with_seeds(mut self, seeds: impl IntoIterator<Item = AudienceDocument>) -> Self {
        for seed in seeds {
            self.seeds.insert(seed.name.clone(), seed);
        }
        self
    }

    /// Builds the catalog with the store, source client, and seeds from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the source client cannot be created or a seed is invalid.
    pub fn from_config(config: &DmpConfig) -> Result<Self> {
        let store = create_object_store(&config.storage);
        let source_client = create_source_client(&config.source)?;
        let seeds = config
            .audiences
            .iter()
            .map(|seed| seed.to_document().map_err(DmpError::Configuration))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(store, source_client, KeyLayout::from_config(&config.storage)).with_seeds(seeds))
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    /// Lists the audiences to sync
    ///
    /// Persisted audiences come first, in key order, followed by configured
    /// seeds that have no persisted state yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the state namespace cannot be listed.
    pub async fn list_pending(&self) -> Result<PendingAudiences> {
        let keys = self.store.list(self.layout.state_prefix()).await?;

        let persisted: BTreeSet<&str> = keys
            .iter()
            .filter_map(|key| self.layout.name_from_state_key(key))
            .collect();
        let seeds: Vec<AudienceName> = self
            .seeds
            .keys()
            .filter(|name| !persisted.contains(name.as_str()))
            .cloned()
            .collect();

        tracing::debug!(
            persisted = persisted.len(),
            seeds = seeds.len(),
            "Listed pending audiences"
        );

        Ok(PendingAudiences {
            keys: keys.into_iter(),
            seeds: seeds.into_iter(),
            layout: self.layout.clone(),
        })
    }

    /// Reconstructs an audience
    ///
    /// Reads the state document (or the configured seed when none is
    /// persisted) and the member data blob. A missing or empty data blob is
    /// fetched from the audience's source.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails, the state document cannot be
    /// decoded or names another audience, the fetch fails, or the audience
    /// cannot be built from its state and data.
    pub async fn load(&self, name: &AudienceName) -> Result<Audience> {
        let document = self.read_document(name).await?;
        let mut source = AudienceSource::from_state(&document.state.source);

        let data = match self.read_data(name).await? {
            Some(data) => data,
            None => {
                tracing::info!(audience = %name, endpoint = %source.endpoint(), "Fetching member data");
                source.fetch(self.source_client.as_ref()).await?
            }
        };

        let audience = Audience::new(document, source, data)?;
        tracing::debug!(
            audience = %name,
            records = audience.members().len(),
            fresh = audience.source().is_fresh(),
            "Loaded audience"
        );
        Ok(audience)
    }

    /// Writes an audience back to storage
    ///
    /// The data blob is written only when it was fetched during this run and
    /// holds at least one member, so an empty fetch is retried next run. The
    /// state document is always written, and written last.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or either write fails.
    pub async fn persist(&self, audience: &Audience) -> Result<()> {
        let name = audience.name();

        if audience.source().is_fresh() && !audience.members().is_empty() {
            let key = self.layout.data_key(name);
            self.store.put(&key, audience.data().to_vec()).await?;
            tracing::debug!(audience = %name, key = %key, bytes = audience.data().len(), "Stored member data");
        }

        let key = self.layout.state_key(name);
        let bytes = encode_state(&audience.snapshot())?;
        self.store.put(&key, bytes).await?;
        tracing::debug!(audience = %name, key = %key, "Stored audience state");

        Ok(())
    }

    /// Reports every pending audience without fetching any data
    ///
    /// # Errors
    ///
    /// Returns an error only if the state namespace cannot be listed; per
    /// audience problems are reported in [`AudienceStatus::error`].
    pub async fn status(&self) -> Result<Vec<AudienceStatus>> {
        let mut statuses = Vec::new();
        for name in self.list_pending().await? {
            statuses.push(self.status_of(&name).await);
        }
        Ok(statuses)
    }

    /// Reports one audience without fetching any data
    pub async fn status_of(&self, name: &AudienceName) -> AudienceStatus {
        let persisted = match self.store.get(&self.layout.state_key(name)).await {
            Ok(bytes) => bytes.is_some(),
            Err(e) => return AudienceStatus::unreadable(name.clone(), false, e.to_string()),
        };

        match self.inspect(name).await {
            Ok(audience) => AudienceStatus {
                name: name.clone(),
                persisted,
                records: audience.members().len(),
                source: audience.source().last_response().clone(),
                destinations: audience
                    .destinations()
                    .map(|destination| DestinationStatus {
                        kind: destination.kind(),
                        status: destination.status(),
                        id: destination.core().snapshot_id(),
                        last_response: destination.last_response().clone(),
                    })
                    .collect(),
                error: None,
            },
            Err(e) => AudienceStatus::unreadable(name.clone(), persisted, e.to_string()),
        }
    }

    /// Builds an audience from stored blobs only
    async fn inspect(&self, name: &AudienceName) -> Result<Audience> {
        let document = self.read_document(name).await?;
        let source = AudienceSource::from_state(&document.state.source);
        let data = self.read_data(name).await?.unwrap_or_default();
        Audience::new(document, source, data)
    }

    async fn read_document(&self, name: &AudienceName) -> Result<AudienceDocument> {
        let key = self.layout.state_key(name);

        let Some(bytes) = self.store.get(&key).await? else {
            return match self.seeds.get(name) {
                Some(seed) => {
                    tracing::info!(audience = %name, "No persisted state, starting from configured seed");
                    Ok(seed.clone())
                }
                None => Err(DmpError::Validation(format!(
                    "No state document or configured seed for audience '{name}'"
                ))),
            };
        };

        let document = decode_state(&bytes)?;
        if document.name != *name {
            return Err(DmpError::Validation(format!(
                "State document {key} describes audience '{}'",
                document.name
            )));
        }
        Ok(document)
    }

    /// Reads the data blob; an empty blob counts as missing
    async fn read_data(&self, name: &AudienceName) -> Result<Option<Vec<u8>>> {
        let data = self.store.get(&self.layout.data_key(name)).await?;
        Ok(data.filter(|bytes| !bytes.is_empty()))
    }
}

/// Single-pass sequence of audience names to sync
///
/// State keys that do not hold a valid audience name are logged and skipped.
#[derive(Debug)]
pub struct PendingAudiences {
    keys: std::vec::IntoIter<String>,
    seeds: std::vec::IntoIter<AudienceName>,
    layout: KeyLayout,
}

impl Iterator for PendingAudiences {
    type Item = AudienceName;

    fn next(&mut self) -> Option<Self::Item> {
        for key in self.keys.by_ref() {
            let Some(name) = self.layout.name_from_state_key(&key) else {
                tracing::debug!(key = %key, "Ignoring non-state object");
                continue;
            };
            match AudienceName::new(name) {
                Ok(name) => return Some(name),
                Err(e) => tracing::warn!(key = %key, error = %e, "Skipping state object with invalid name"),
            }
        }
        self.seeds.next()
    }
}
