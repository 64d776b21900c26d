//! Core business logic for DMP Sync.
//!
//! This module contains the core business logic and orchestration for audience syncs.
//!
//! # Modules
//!
//! - [`normalize`] - Email, phone and zip canonicalization and digesting
//! - [`members`] - Normalized member records built from raw rows
//! - [`destination`] - Per-destination adapters and the upload state machine
//! - [`audience`] - Audiences, their data source and state documents
//! - [`catalog`] - Discovery, loading and persistence of audiences
//! - [`sync`] - Run orchestration and summary
//!
//! # Sync Workflow
//!
//! 1. **List**: Read audience names from the state namespace (plus configured seeds)
//! 2. **Load**: Read the state document and member data, fetching data when none is stored
//! 3. **Normalize**: Build the member set with digested fields
//! 4. **Evaluate**: Derive each destination's status from its persisted id
//! 5. **Upload**: Post payloads to every destination that is not posted yet
//! 6. **Persist**: Write fresh data, then the state snapshot
//! 7. **Report**: Generate the sync summary
//!
//! # Example
//!
//! ```rust,no_run
//! use dmp_sync::config::load_config;
//! use dmp_sync::core::sync::SyncCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("dmp-sync.toml")?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let coordinator = SyncCoordinator::from_config(&config, shutdown_rx)?;
//!
//! let summary = coordinator.execute_sync().await?;
//!
//! println!("Audiences: {}", summary.total_audiences);
//! println!("Uploaded: {}", summary.uploads_succeeded);
//! println!("Failed: {}", summary.uploads_failed);
//! # Ok(())
//! # }
//! ```

pub mod audience;
pub mod catalog;
pub mod destination;
pub mod members;
pub mod normalize;
pub mod sync;
