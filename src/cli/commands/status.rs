//! Status command implementation
//!
//! This module implements the `status` command for displaying the
//! per-destination sync status of every audience. Nothing is fetched or
//! uploaded.

use crate::config::load_config;
use crate::core::catalog::{AudienceStatus, SyncCatalog};
use crate::core::destination::SyncStatus;
use crate::domain::ids::AudienceName;
use crate::domain::LastResponse;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Filter by audience name
    #[arg(long)]
    pub audience: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking sync status");

        println!("📊 Sync Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {}", e);
                return Ok(2); // Configuration error exit code
            }
        };

        let catalog = match SyncCatalog::from_config(&config) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to open audience catalog");
                println!("   Error: {}", e);
                return Ok(2);
            }
        };

        let statuses = match &self.audience {
            Some(name) => match AudienceName::new(name.as_str()) {
                Ok(name) => vec![catalog.status_of(&name).await],
                Err(e) => {
                    println!("❌ Invalid audience name: {e}");
                    return Ok(2);
                }
            },
            None => match catalog.status().await {
                Ok(s) => s,
                Err(e) => {
                    println!("❌ Failed to list audiences");
                    println!("   Error: {}", e);
                    return Ok(5); // Fatal error exit code
                }
            },
        };

        if statuses.is_empty() {
            println!("No audiences found.");
            println!("Declare [[audiences]] in the configuration, then run 'dmp-sync sync'.");
            return Ok(0);
        }

        println!("Found {} audience(s):", statuses.len());
        println!();
        println!(
            "{:<30} {:<10} {:<15} {:<20} {:<25}",
            "Audience", "Records", "Destination", "Status", "Last Response"
        );
        println!("{}", "-".repeat(100));

        for status in &statuses {
            print_audience(status);
        }

        println!();
        Ok(0)
    }
}

fn print_audience(status: &AudienceStatus) {
    let name = if status.persisted {
        status.name.to_string()
    } else {
        format!("{} (seed)", status.name)
    };

    if let Some(error) = &status.error {
        println!("{:<30} ❌ {}", name, error);
        return;
    }

    if status.destinations.is_empty() {
        println!("{:<30} {:<10} {:<15}", name, status.records, "none");
        return;
    }

    for (i, destination) in status.destinations.iter().enumerate() {
        let label = status_label(destination.status);
        let (audience, records) = if i == 0 {
            (name.as_str(), status.records.to_string())
        } else {
            ("", String::new())
        };

        println!(
            "{:<30} {:<10} {:<15} {:<20} {:<25}",
            audience,
            records,
            destination.kind.to_string(),
            label,
            describe_response(&destination.last_response)
        );
    }
}

fn status_label(status: SyncStatus) -> String {
    let icon = match status {
        SyncStatus::Posted => "✅",
        SyncStatus::NotPosted => "⏳",
        SyncStatus::NotFetched => "⏸️ ",
    };
    format!("{icon} {status} ({})", status.code())
}

fn describe_response(response: &LastResponse) -> String {
    let date = response
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "Never".to_string());

    match (response.status, &response.message) {
        (Some(code), _) => format!("{date} ({code})"),
        (None, Some(message)) if response.date.is_some() => format!("{date} ({message})"),
        _ => date,
    }
}
