//! Sync command implementation
//!
//! This module implements the `sync` command, which pushes every pending
//! audience to its destinations and persists the resulting state.

use crate::config::load_config;
use crate::core::audience::UploadOutcome;
use crate::core::sync::{SyncCoordinator, SyncSummary};
use crate::domain::ids::AudienceName;
use clap::Args;
use std::time::Duration;
use tokio::sync::watch;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Dry run mode - build payloads without uploading or writing state
    #[arg(long)]
    pub dry_run: bool,

    /// Only sync these audiences (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub audience: Vec<String>,

    /// Override the number of audiences processed in parallel
    #[arg(long)]
    pub max_concurrency: Option<usize>,
}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting sync command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        // Apply CLI overrides
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Some(max_concurrency) = self.max_concurrency {
            tracing::info!(max_concurrency, "Overriding audience concurrency from CLI");
            config.sync.max_concurrent_audiences = max_concurrency;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let audiences = match self.parse_audiences() {
            Ok(names) => names,
            Err(e) => {
                eprintln!("Invalid --audience value: {e}");
                return Ok(2);
            }
        };

        if config.application.dry_run {
            tracing::info!("Dry run mode enabled - nothing will be uploaded or written");
            println!("🔍 DRY RUN MODE - No uploads, no state written");
            println!();
        }

        let grace = Duration::from_secs(config.sync.shutdown_timeout_secs);

        let coordinator = match SyncCoordinator::from_config(&config, shutdown_signal.clone()) {
            Ok(c) => c.with_audience_filter(audiences),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create sync coordinator");
                eprintln!("Failed to initialize sync: {e}");
                return Ok(2);
            }
        };

        println!("🚀 Starting sync...");
        println!();

        let summary = match run_with_grace(&coordinator, shutdown_signal, grace).await {
            Some(Ok(s)) => s,
            Some(Err(e)) => {
                tracing::error!(error = %e, "Sync failed");
                eprintln!("Sync failed: {e}");
                return Ok(5); // Fatal error exit code
            }
            None => {
                tracing::warn!(
                    timeout_secs = grace.as_secs(),
                    "Shutdown grace period expired, abandoning in-flight audiences"
                );
                println!();
                println!("⚠️  Shutdown grace period expired; in-flight audiences were abandoned.");
                println!("   Their persisted state is unchanged and they will be retried next run.");
                return Ok(130);
            }
        };

        print_summary(&summary);

        let exit_code = if summary.interrupted {
            println!("⚠️  Sync interrupted gracefully. Completed audiences were saved.");
            println!("   Run the same command to continue.");
            println!();
            tracing::info!("Sync interrupted by user signal");
            130 // SIGINT exit code (standard Unix convention)
        } else if summary.is_successful() {
            println!("✅ Sync completed successfully!");
            0
        } else {
            println!("⚠️  Sync completed with failures");
            1 // Partial success
        };

        Ok(exit_code)
    }

    fn parse_audiences(&self) -> Result<Vec<AudienceName>, String> {
        self.audience
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(AudienceName::new)
            .collect()
    }
}

/// Runs the sync; after a shutdown signal, waits at most `grace` for it to finish
///
/// Returns `None` when the grace period expired.
async fn run_with_grace(
    coordinator: &SyncCoordinator,
    mut shutdown_signal: watch::Receiver<bool>,
    grace: Duration,
) -> Option<crate::domain::Result<SyncSummary>> {
    let sync = coordinator.execute_sync();
    tokio::pin!(sync);

    tokio::select! {
        result = &mut sync => Some(result),
        _ = shutdown_requested(&mut shutdown_signal) => {
            println!("\n⚠️  Waiting up to {}s for in-flight audiences...", grace.as_secs());
            tokio::time::timeout(grace, &mut sync).await.ok()
        }
    }
}

async fn shutdown_requested(signal: &mut watch::Receiver<bool>) {
    while !*signal.borrow() {
        if signal.changed().await.is_err() {
            // Sender gone, no shutdown can arrive any more
            std::future::pending::<()>().await;
        }
    }
}

fn print_summary(summary: &SyncSummary) {
    println!();
    println!("📊 Sync Summary:");
    println!("  Run ID: {}", summary.run_id);
    println!("  Audiences: {}", summary.total_audiences);
    println!("  Synced: {}", summary.synced_audiences);
    println!("  Failed: {}", summary.failed_audiences);
    println!("  Uploads Succeeded: {}", summary.uploads_succeeded);
    println!("  Uploads Failed: {}", summary.uploads_failed);
    println!("  Uploads Skipped: {}", summary.uploads_skipped);
    if summary.dry_run {
        println!("  Payloads Built (dry run): {}", summary.dry_run_payloads);
    }
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    for report in &summary.audiences {
        println!("  {}", report.name);
        for outcome in &report.outcomes {
            let icon = match outcome.outcome {
                UploadOutcome::Uploaded { .. } => "✅",
                UploadOutcome::Failed { .. } => "❌",
                UploadOutcome::DryRun { .. } => "🔍",
                _ => "⏭️ ",
            };
            println!("    {icon} {}: {}", outcome.kind, outcome.outcome);
        }
        if let Some(error) = &report.error {
            println!("    ❌ {:?}: {}", error.error_type, error.message);
        }
    }
    if !summary.audiences.is_empty() {
        println!();
    }

    if !summary.errors.is_empty() {
        println!("⚠️  Errors encountered:");
        for error in &summary.errors {
            println!("  - {:?}: {}", error.error_type, error.message);
            if let Some(context) = &error.context {
                println!("    Context: {context}");
            }
        }
        println!();
    }
}
