//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the DMP Sync configuration file.

use crate::config::{load_config, StorageBackend};
use crate::domain::ids::DestinationKind;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading validates as well
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        match config.storage.backend {
            StorageBackend::Local => println!("  Storage: local ({})", config.storage.root),
            StorageBackend::Memory => println!("  Storage: in-memory"),
        }
        println!(
            "  Key Prefixes: {}/, {}/",
            config.storage.state_prefix, config.storage.data_prefix
        );

        for kind in DestinationKind::ALL {
            match config.destinations.get(kind) {
                Some(destination) if destination.enabled => println!(
                    "  {kind}: {} (advertiser {})",
                    destination.base_url, destination.advertiser_id
                ),
                Some(_) => println!("  {kind}: disabled"),
                None => println!("  {kind}: not configured"),
            }
        }

        println!(
            "  Parallel Audiences: {}",
            config.sync.max_concurrent_audiences
        );
        println!("  Upload Timeout: {}s", config.sync.upload_timeout_seconds);
        println!("  Upload Attempts: {}", config.sync.upload_attempts);
        println!("  Retry Delay: {}ms", config.sync.retry_delay_ms);
        println!(
            "  Seed Audiences: {:?}",
            config
                .audiences
                .iter()
                .map(|seed| seed.name.as_str())
                .collect::<Vec<_>>()
        );
        println!();

        Ok(0)
    }
}
