//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::DmpConfig;
use super::secret_string;
use crate::domain::errors::DmpError;
use crate::domain::result::Result;
use crate::domain::DestinationKind;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "DMP";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into DmpConfig
/// 4. Applies environment variable overrides (DMP_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use dmp_sync::config::loader::load_config;
///
/// let config = load_config("dmp-sync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<DmpConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(DmpError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        DmpError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses, overrides and validates configuration text
pub fn parse_config(contents: &str) -> Result<DmpConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: DmpConfig = toml::from_str(&contents)
        .map_err(|e| DmpError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        DmpError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| DmpError::Other(format!("invalid substitution pattern: {e}")))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    caps[0].to_string()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(DmpError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn env(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{key}")).ok()
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env(key).and_then(|value| value.parse().ok())
}

/// Applies environment variable overrides using the DMP_* prefix
///
/// Environment variables follow the pattern DMP_<SECTION>_<KEY>, for example
/// DMP_SYNC_UPLOAD_ATTEMPTS or DMP_DESTINATIONS_ADTECH_A_ACCESS_TOKEN.
/// Destination overrides only apply to destinations present in the file.
fn apply_env_overrides(config: &mut DmpConfig) {
    // Application overrides
    if let Some(val) = env("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env_parsed("APPLICATION_DRY_RUN") {
        config.application.dry_run = val;
    }

    // Storage overrides
    if let Some(val) = env("STORAGE_ROOT") {
        config.storage.root = val;
    }
    if let Some(val) = env("STORAGE_BACKEND") {
        match val.to_lowercase().as_str() {
            "local" => config.storage.backend = super::schema::StorageBackend::Local,
            "memory" => config.storage.backend = super::schema::StorageBackend::Memory,
            other => tracing::warn!(backend = %other, "Ignoring unknown DMP_STORAGE_BACKEND"),
        }
    }

    // Source overrides
    if let Some(val) = env("SOURCE_API_KEY") {
        config.source.api_key = Some(secret_string(val));
    }
    if let Some(val) = env_parsed("SOURCE_TIMEOUT_SECONDS") {
        config.source.timeout_seconds = val;
    }

    // Destination overrides
    for kind in DestinationKind::ALL {
        let section = format!("DESTINATIONS_{}", kind.config_key().to_uppercase());
        let Some(destination) = config.destinations.get_mut(kind) else {
            continue;
        };
        if let Some(val) = env_parsed(&format!("{section}_ENABLED")) {
            destination.enabled = val;
        }
        if let Some(val) = env(&format!("{section}_BASE_URL")) {
            destination.base_url = val;
        }
        if let Some(val) = env(&format!("{section}_ADVERTISER_ID")) {
            destination.advertiser_id = val;
        }
        if let Some(val) = env(&format!("{section}_ACCESS_TOKEN")) {
            destination.access_token = secret_string(val);
        }
    }

    // Sync overrides
    if let Some(val) = env_parsed("SYNC_MAX_CONCURRENT_AUDIENCES") {
        config.sync.max_concurrent_audiences = val;
    }
    if let Some(val) = env_parsed("SYNC_UPLOAD_TIMEOUT_SECONDS") {
        config.sync.upload_timeout_seconds = val;
    }
    if let Some(val) = env_parsed("SYNC_UPLOAD_ATTEMPTS") {
        config.sync.upload_attempts = val;
    }
    if let Some(val) = env_parsed("SYNC_RETRY_DELAY_MS") {
        config.sync.retry_delay_ms = val;
    }

    // Logging overrides
    if let Some(val) = env_parsed("LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("DMP_LOADER_TEST_TOKEN", "tok-123");
        let input = "access_token = \"${DMP_LOADER_TEST_TOKEN}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "access_token = \"tok-123\"\n");
        std::env::remove_var("DMP_LOADER_TEST_TOKEN");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("DMP_LOADER_MISSING_VAR");
        let input = "access_token = \"${DMP_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("DMP_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        let input = "# token = \"${DMP_LOADER_COMMENTED_OUT}\"";
        assert!(substitute_env_vars(input).is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(matches!(result, Err(DmpError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[storage]
backend = "memory"

[destinations.adtech_a]
base_url = "https://api.adtech-a.example.com"
advertiser_id = "adv-1"
access_token = "token-a"

[[audiences]]
name = "Sample"
endpoint = "https://gateway.example.com/audiences/sample"
params = { segment = "sample", limit = 1000 }
adtech_a = { audience_type = "TYPE_X" }
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert!(config.destinations.adtech_a.is_some());
        assert!(config.destinations.adtech_b.is_none());
        assert_eq!(config.audiences.len(), 1);
        assert_eq!(config.audiences[0].params["limit"], serde_json::json!(1000));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = parse_config("[sync]\nupload_attempts = 0\n");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("upload_attempts"));
    }
}
