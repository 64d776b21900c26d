//! Configuration management for DMP Sync.
//!
//! DMP Sync uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `DMP_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run switch
//! - [`StorageConfig`] - Object store backend and key prefixes
//! - [`SourceConfig`] - Data source client settings
//! - [`DestinationsConfig`] - One [`DestinationConfig`] per destination kind
//! - [`SyncConfig`] - Concurrency, upload timeout and attempts
//! - [`LoggingConfig`] - Local log files
//! - [`AudienceSeed`] - Audiences created on first run
//!
//! # Example Configuration
//!
//! ```toml
//! [storage]
//! backend = "local"
//! root = "/var/lib/dmp-sync"
//!
//! [destinations.adtech_a]
//! base_url = "https://api.adtech-a.example.com"
//! advertiser_id = "1234"
//! access_token = "${ADTECH_A_TOKEN}"
//!
//! [[audiences]]
//! name = "Sample"
//! endpoint = "https://gateway.example.com/audiences/sample"
//! adtech_a = { audience_type = "TYPE_X" }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    AdtechASeed, AdtechBSeed, ApplicationConfig, AudienceSeed, DestinationConfig,
    DestinationsConfig, DmpConfig, LoggingConfig, SourceConfig, StorageBackend, StorageConfig,
    SyncConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
