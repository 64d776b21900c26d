//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "dmp-sync.toml")]
    pub output: String,

    /// Include every option with comments and a sample audience
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing DMP Sync configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your destinations and audiences", self.output);
                println!("  2. Create a .env file with your credentials:");
                println!("     - ADTECH_A_ACCESS_TOKEN and ADTECH_B_ACCESS_TOKEN");
                println!("     - GATEWAY_API_KEY if the data source requires one");
                println!("  3. Validate configuration: dmp-sync validate-config");
                println!("  4. Preview payloads: dmp-sync sync --dry-run");
                println!("  5. Run sync: dmp-sync sync");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# DMP Sync Configuration File
# Audience synchronization tool

[storage]
backend = "local"
root = "./dmp-data"

[destinations.adtech_a]
base_url = "https://api.adtech-a.example.com"
advertiser_id = "your-advertiser-id"
access_token = "${ADTECH_A_ACCESS_TOKEN}"

[destinations.adtech_b]
base_url = "https://api.adtech-b.example.com"
advertiser_id = "your-advertiser-id"
access_token = "${ADTECH_B_ACCESS_TOKEN}"

[logging]
local_path = "./logs"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# DMP Sync Configuration File
# Audience synchronization tool
#
# Values of the form ${VAR} are read from the environment (or a .env file).
# Any key can also be overridden with DMP_<SECTION>_<KEY>, for example
# DMP_SYNC_MAX_CONCURRENT_AUDIENCES=8.

[application]
# Log level: trace, debug, info, warn, error
log_level = "info"

# Build payloads without uploading or writing state
dry_run = false

[storage]
# Object store backend: local, memory
backend = "local"

# Root directory of the local backend
root = "./dmp-data"

# Key prefixes: <state_prefix>/<name>.yml and <data_prefix>/<name>.json.gz
state_prefix = "state"
data_prefix = "data"

[source]
# Data source request timeout in seconds
timeout_seconds = 60

# API key sent with every data source request (optional)
api_key = "${GATEWAY_API_KEY}"
api_key_header = "x-api-key"

[destinations.adtech_a]
enabled = true
base_url = "https://api.adtech-a.example.com"
api_version = "v1"
advertiser_id = "your-advertiser-id"
access_token = "${ADTECH_A_ACCESS_TOKEN}"
timeout_seconds = 60

[destinations.adtech_b]
enabled = true
base_url = "https://api.adtech-b.example.com"
api_version = "v1"
advertiser_id = "your-advertiser-id"
access_token = "${ADTECH_B_ACCESS_TOKEN}"
timeout_seconds = 60

[sync]
# Audiences processed in parallel (1-64)
max_concurrent_audiences = 4

# Upper bound on a single upload, in seconds
upload_timeout_seconds = 120

# Upload attempts per destination within one run (1-5)
upload_attempts = 1

# Wait before the first retry in milliseconds, doubled for each further retry
retry_delay_ms = 1000

# Grace period for in-flight audiences after Ctrl+C, in seconds
shutdown_timeout_secs = 30

[logging]
# JSON log files with rotation: daily, hourly, never
local_enabled = true
local_path = "./logs"
local_rotation = "daily"

# Audiences created on the first run. Once state has been persisted for an
# audience, its state document is authoritative and the seed is ignored.
[[audiences]]
name = "Sample"
description = "Sample audience"
endpoint = "https://gateway.example.com/audiences/sample"
params = { segment = "sample", limit = 1000 }
adtech_a = { audience_type = "TYPE_X" }
# Days until expiry (0-540), or 1000 for no expiry
adtech_b = { expiration_time = 1000 }
"#
        .to_string()
    }
}
