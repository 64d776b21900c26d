//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for DMP Sync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// DMP Sync - Audience synchronization tool
#[derive(Parser, Debug)]
#[command(name = "dmp-sync")]
#[command(version, about, long_about = None)]
#[command(author = "DMP Sync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "dmp-sync.toml", env = "DMP_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "DMP_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sync audiences to every configured destination
    Sync(commands::sync::SyncArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show per-destination status of every audience
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_sync() {
        let cli = Cli::parse_from(["dmp-sync", "sync"]);
        assert_eq!(cli.config, "dmp-sync.toml");
        assert!(matches!(cli.command, Commands::Sync(_)));
    }

    #[test]
    fn test_cli_parse_sync_options() {
        let cli = Cli::parse_from([
            "dmp-sync",
            "sync",
            "--dry-run",
            "--audience",
            "Sample,Lookalikes",
            "--max-concurrency",
            "8",
        ]);
        let Commands::Sync(args) = cli.command else {
            panic!("expected sync command");
        };
        assert!(args.dry_run);
        assert_eq!(args.audience, vec!["Sample", "Lookalikes"]);
        assert_eq!(args.max_concurrency, Some(8));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["dmp-sync", "--config", "custom.toml", "sync"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["dmp-sync", "--log-level", "debug", "sync"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["dmp-sync", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::parse_from(["dmp-sync", "status", "--audience", "Sample"]);
        let Commands::Status(args) = cli.command else {
            panic!("expected status command");
        };
        assert_eq!(args.audience.as_deref(), Some("Sample"));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["dmp-sync", "init", "--output", "other.toml", "--force"]);
        let Commands::Init(args) = cli.command else {
            panic!("expected init command");
        };
        assert_eq!(args.output, "other.toml");
        assert!(args.force);
    }
}
