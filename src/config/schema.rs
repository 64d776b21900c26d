//! Configuration schema types
//!
//! This module defines the configuration structure for DMP Sync.

use crate::config::SecretString;
use crate::core::audience::state::{
    AdtechAState, AdtechBState, AudienceDocument, AudienceState, IntegerSetting, SourceState,
};
use crate::domain::{AudienceName, DestinationKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Main DMP Sync configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DmpConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Object store holding state documents and member data
    #[serde(default)]
    pub storage: StorageConfig,

    /// Data source client settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Destination endpoints and credentials
    #[serde(default)]
    pub destinations: DestinationsConfig,

    /// Sync run settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Audiences to create when no persisted state exists yet
    #[serde(default)]
    pub audiences: Vec<AudienceSeed>,
}

impl DmpConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.storage.validate()?;
        self.source.validate()?;
        self.destinations.validate()?;
        self.sync.validate()?;
        self.logging.validate()?;

        let mut seen = HashSet::new();
        for seed in &self.audiences {
            seed.validate()?;
            if !seen.insert(seed.name.as_str()) {
                return Err(format!("audiences: duplicate audience name '{}'", seed.name));
            }
        }

        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (build payloads, upload and persist nothing)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Object store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Files under a local root directory
    #[default]
    Local,
    /// Process memory; nothing survives the run
    Memory,
}

/// Object store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Root directory for the local backend
    #[serde(default = "default_storage_root")]
    pub root: String,

    /// Key prefix of state documents
    #[serde(default = "default_state_prefix")]
    pub state_prefix: String,

    /// Key prefix of member data blobs
    #[serde(default = "default_data_prefix")]
    pub data_prefix: String,
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.backend == StorageBackend::Local && self.root.trim().is_empty() {
            return Err("storage.root cannot be empty for the local backend".to_string());
        }

        for (field, prefix) in [
            ("state_prefix", &self.state_prefix),
            ("data_prefix", &self.data_prefix),
        ] {
            let trimmed = prefix.trim_matches('/');
            if trimmed.is_empty() {
                return Err(format!("storage.{field} cannot be empty"));
            }
            if trimmed.split('/').any(|segment| segment.is_empty() || segment == "..") {
                return Err(format!("storage.{field} '{prefix}' is not a valid key prefix"));
            }
        }

        if self.state_prefix.trim_matches('/') == self.data_prefix.trim_matches('/') {
            return Err("storage.state_prefix and storage.data_prefix must differ".to_string());
        }

        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root: default_storage_root(),
            state_prefix: default_state_prefix(),
            data_prefix: default_data_prefix(),
        }
    }
}

/// Data source client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// API key sent with every fetch (optional)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Header carrying the API key
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
}

impl SourceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.timeout_seconds == 0 {
            return Err("source.timeout_seconds must be > 0".to_string());
        }
        if self.api_key_header.trim().is_empty() {
            return Err("source.api_key_header cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            api_key: None,
            api_key_header: default_api_key_header(),
        }
    }
}

/// Destination endpoints, one optional table per kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DestinationsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adtech_a: Option<DestinationConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adtech_b: Option<DestinationConfig>,
}

impl DestinationsConfig {
    /// Returns the configuration for a destination kind
    pub fn get(&self, kind: DestinationKind) -> Option<&DestinationConfig> {
        match kind {
            DestinationKind::AdtechA => self.adtech_a.as_ref(),
            DestinationKind::AdtechB => self.adtech_b.as_ref(),
        }
    }

    /// Returns a mutable configuration for a destination kind
    pub fn get_mut(&mut self, kind: DestinationKind) -> Option<&mut DestinationConfig> {
        match kind {
            DestinationKind::AdtechA => self.adtech_a.as_mut(),
            DestinationKind::AdtechB => self.adtech_b.as_mut(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        for kind in DestinationKind::ALL {
            if let Some(config) = self.get(kind) {
                config.validate(kind)?;
            }
        }
        Ok(())
    }
}

/// One destination endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL of the destination API
    pub base_url: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Advertiser account that owns the uploaded audiences
    pub advertiser_id: String,

    /// Bearer token
    /// Stored securely in memory and automatically zeroized on drop
    pub access_token: SecretString,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl DestinationConfig {
    fn validate(&self, kind: DestinationKind) -> Result<(), String> {
        use secrecy::ExposeSecret;

        let section = format!("destinations.{}", kind.config_key());

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!("{section}.base_url must start with http:// or https://"));
        }
        if self.api_version.trim().is_empty() {
            return Err(format!("{section}.api_version cannot be empty"));
        }
        if self.advertiser_id.trim().is_empty() {
            return Err(format!("{section}.advertiser_id cannot be empty"));
        }
        if self.enabled && self.access_token.expose_secret().is_blank() {
            return Err(format!("{section}.access_token cannot be empty"));
        }
        if self.timeout_seconds == 0 {
            return Err(format!("{section}.timeout_seconds must be > 0"));
        }
        Ok(())
    }
}

/// Sync run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Audiences processed in parallel
    #[serde(default = "default_max_concurrent_audiences")]
    pub max_concurrent_audiences: usize,

    /// Upper bound on one upload call, in seconds
    #[serde(default = "default_upload_timeout_seconds")]
    pub upload_timeout_seconds: u64,

    /// Upload attempts per destination within one run
    #[serde(default = "default_upload_attempts")]
    pub upload_attempts: u32,

    /// Wait before the first in-run retry, in milliseconds; doubled per retry
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Grace period for in-flight audiences after a shutdown signal
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl SyncConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_concurrent_audiences == 0 || self.max_concurrent_audiences > 64 {
            return Err(format!(
                "sync.max_concurrent_audiences must be between 1 and 64, got {}",
                self.max_concurrent_audiences
            ));
        }
        if self.upload_timeout_seconds == 0 {
            return Err("sync.upload_timeout_seconds must be > 0".to_string());
        }
        if self.upload_attempts == 0 || self.upload_attempts > 5 {
            return Err(format!(
                "sync.upload_attempts must be between 1 and 5, got {}",
                self.upload_attempts
            ));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_concurrent_audiences: default_max_concurrent_audiences(),
            upload_timeout_seconds: default_upload_timeout_seconds(),
            upload_attempts: default_upload_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

/// Audience declared in configuration
///
/// Used to create the first state document of an audience; once state has
/// been persisted the seed is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudienceSeed {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Data source endpoint
    pub endpoint: String,

    /// Query parameters sent to the data source
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adtech_a: Option<AdtechASeed>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adtech_b: Option<AdtechBSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdtechASeed {
    pub audience_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdtechBSeed {
    /// Days until expiry; a number or a quoted number
    #[serde(default)]
    pub expiration_time: Option<IntegerSetting>,
}

impl AudienceSeed {
    fn validate(&self) -> Result<(), String> {
        AudienceName::new(self.name.as_str()).map_err(|e| format!("audiences: {e}"))?;
        if self.endpoint.trim().is_empty() {
            return Err(format!("audiences.{}: endpoint cannot be empty", self.name));
        }
        if self.adtech_a.is_none() && self.adtech_b.is_none() {
            return Err(format!(
                "audiences.{}: at least one destination (adtech_a, adtech_b) is required",
                self.name
            ));
        }
        Ok(())
    }

    /// Builds the initial state document for this audience
    pub fn to_document(&self) -> Result<AudienceDocument, String> {
        let name = AudienceName::new(self.name.as_str())?;
        let state = AudienceState {
            description: self.description.clone(),
            source: SourceState {
                endpoint: self.endpoint.clone(),
                params: self.params.clone(),
                last_response: Default::default(),
            },
            adtech_a: self.adtech_a.as_ref().map(|seed| AdtechAState {
                name: Some(self.name.clone()),
                audience_type: Some(seed.audience_type.clone()),
                ..Default::default()
            }),
            adtech_b: self.adtech_b.as_ref().map(|seed| AdtechBState {
                name: Some(self.name.clone()),
                expiration_time: seed.expiration_time.clone(),
                ..Default::default()
            }),
        };
        Ok(AudienceDocument::new(name, state))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_storage_root() -> String {
    "./dmp-data".to_string()
}

fn default_state_prefix() -> String {
    "state".to_string()
}

fn default_data_prefix() -> String {
    "data".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_api_key_header() -> String {
    "x-api-key".to_string()
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_max_concurrent_audiences() -> usize {
    4
}

fn default_upload_timeout_seconds() -> u64 {
    120
}

fn default_upload_attempts() -> u32 {
    1
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_shutdown_timeout_secs() -> u64 {
    30
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn destination() -> DestinationConfig {
        DestinationConfig {
            enabled: true,
            base_url: "https://api.adtech-a.example.com".to_string(),
            api_version: "v1".to_string(),
            advertiser_id: "adv-1".to_string(),
            access_token: secret_string("token".to_string()),
            timeout_seconds: 30,
        }
    }

    fn seed() -> AudienceSeed {
        AudienceSeed {
            name: "Sample".to_string(),
            description: "Sample audience".to_string(),
            endpoint: "https://gateway.example.com/audiences/sample".to_string(),
            params: BTreeMap::new(),
            adtech_a: Some(AdtechASeed {
                audience_type: "TYPE_X".to_string(),
            }),
            adtech_b: Some(AdtechBSeed::default()),
        }
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_storage_config_validation() {
        let mut config = StorageConfig::default();
        assert!(config.validate().is_ok());

        config.data_prefix = "state/".to_string();
        assert!(config.validate().unwrap_err().contains("must differ"));

        config.data_prefix = "../data".to_string();
        assert!(config.validate().is_err());

        config.data_prefix = "data".to_string();
        config.root = String::new();
        assert!(config.validate().is_err());

        config.backend = StorageBackend::Memory;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_destination_config_validation() {
        let mut config = destination();
        assert!(config.validate(DestinationKind::AdtechA).is_ok());

        config.base_url = "ftp://example.com".to_string();
        let err = config.validate(DestinationKind::AdtechA).unwrap_err();
        assert!(err.contains("destinations.adtech_a.base_url"));

        config.base_url = "https://example.com".to_string();
        config.access_token = secret_string(String::new());
        assert!(config.validate(DestinationKind::AdtechB).is_err());

        config.enabled = false;
        assert!(config.validate(DestinationKind::AdtechB).is_ok());
    }

    #[test]
    fn test_sync_config_validation() {
        let mut config = SyncConfig::default();
        assert!(config.validate().is_ok());

        config.max_concurrent_audiences = 0;
        assert!(config.validate().is_err());

        config.max_concurrent_audiences = 4;
        config.upload_attempts = 6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(config.local_enabled);
        assert_eq!(config.local_path, "./logs");
        assert_eq!(config.local_rotation, "daily");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_seed_names_rejected() {
        let config = DmpConfig {
            audiences: vec![seed(), seed()],
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("duplicate"));
    }

    #[test]
    fn test_seed_requires_destination() {
        let mut seed = seed();
        seed.adtech_a = None;
        seed.adtech_b = None;
        assert!(seed.validate().is_err());
    }

    #[test]
    fn test_seed_to_document() {
        let document = seed().to_document().unwrap();
        assert_eq!(document.name.as_str(), "Sample");
        assert_eq!(document.state.description, "Sample audience");

        let a = document.state.adtech_a.unwrap();
        assert_eq!(a.name.as_deref(), Some("Sample"));
        assert_eq!(a.audience_type.as_deref(), Some("TYPE_X"));
        assert!(a.id.is_none());

        let b = document.state.adtech_b.unwrap();
        assert!(b.expiration_time.is_none());
    }

    #[test]
    fn test_default_values() {
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_state_prefix(), "state");
        assert_eq!(default_data_prefix(), "data");
        assert_eq!(default_upload_attempts(), 1);
        assert_eq!(default_retry_delay_ms(), 1000);
        assert_eq!(default_max_concurrent_audiences(), 4);
    }
}
