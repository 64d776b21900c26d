// DMP Sync - Audience synchronization tool
// Copyright (c) 2025 DMP Sync Contributors
// Licensed under the MIT License

//! # DMP Sync - Audience synchronization
//!
//! DMP Sync pushes audience membership lists (email, phone number, postal
//! code) from one data source to several advertising destinations, and
//! remembers what it uploaded so that repeated runs never upload an audience
//! twice.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Normalizing** member fields and replacing them with SHA-256 digests
//! - **Deciding** per destination whether an audience still needs uploading
//! - **Uploading** destination-specific payloads concurrently
//! - **Persisting** per-audience state documents for the next run
//!
//! ## Architecture
//!
//! DMP Sync follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (normalization, destinations, audiences, sync)
//! - [`adapters`] - External integrations (object store, data source, destinations)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dmp_sync::config::load_config;
//! use dmp_sync::core::sync::SyncCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("dmp-sync.toml")?;
//!
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     let coordinator = SyncCoordinator::from_config(&config, shutdown_rx)?;
//!
//!     let summary = coordinator.execute_sync().await?;
//!
//!     println!("Uploaded to {} destinations", summary.uploads_succeeded);
//!     Ok(())
//! }
//! ```
//!
//! ## Idempotent Uploads
//!
//! Every destination of an audience carries the id the destination assigned
//! on upload. The id alone decides the status at load time:
//!
//! | id | member records | status |
//! |---|---|---|
//! | present | any | `Posted` |
//! | absent | > 0 | `NotPosted` |
//! | absent | 0 | `NotFetched` |
//!
//! Only `NotPosted` destinations are uploaded to. A successful upload
//! stores the new id in the state snapshot, so the next run loads the
//! destination as `Posted`.
//!
//! ```rust
//! use dmp_sync::core::destination::SyncStatus;
//!
//! assert_eq!(SyncStatus::derive(Some("123456789"), 2), SyncStatus::Posted);
//! assert_eq!(SyncStatus::derive(None, 2), SyncStatus::NotPosted);
//! assert_eq!(SyncStatus::derive(None, 0), SyncStatus::NotFetched);
//! ```
//!
//! ## Normalization
//!
//! ```rust
//! use dmp_sync::core::normalize::{digest, FieldKind, RawValue};
//!
//! let emails = FieldKind::Email.normalize(&RawValue::from(" A@Example.com |b@example.com"));
//! assert_eq!(emails, vec![digest("a@example.com"), digest("b@example.com")]);
//!
//! // Digests pass through unchanged
//! assert_eq!(FieldKind::Email.normalize(&RawValue::from(emails[0].as_str())), vec![emails[0].clone()]);
//! ```
//!
//! ## Error Handling
//!
//! DMP Sync uses the [`domain::DmpError`] type for all errors:
//!
//! ```rust,no_run
//! use dmp_sync::domain::DmpError;
//!
//! fn example() -> Result<(), DmpError> {
//!     let config = dmp_sync::config::load_config("dmp-sync.toml")?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
