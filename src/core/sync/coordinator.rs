//! Sync coordinator - main orchestrator for a sync run
//!
//! Runs every pending audience through load → sync → persist with bounded
//! parallelism. Each task owns its audience; nothing is shared between
//! audiences except the catalog and the transports.

use crate::adapters::destination::{create_transports, TransportRegistry};
use crate::config::DmpConfig;
use crate::core::audience::SyncOptions;
use crate::core::catalog::SyncCatalog;
use crate::core::sync::summary::{AudienceReport, SyncError, SyncErrorType, SyncSummary};
use crate::domain::ids::AudienceName;
use crate::domain::{DmpError, Result};
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

/// Sync coordinator
pub struct SyncCoordinator {
    catalog: Arc<SyncCatalog>,
    transports: TransportRegistry,
    options: SyncOptions,
    max_concurrency: usize,
    audience_filter: Option<BTreeSet<AudienceName>>,
    shutdown_signal: watch::Receiver<bool>,
}

impl SyncCoordinator {
    pub fn new(
        catalog: SyncCatalog,
        transports: TransportRegistry,
        options: SyncOptions,
        max_concurrency: usize,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            transports,
            options,
            max_concurrency: max_concurrency.max(1),
            audience_filter: None,
            shutdown_signal,
        }
    }

    /// Create a coordinator wired to the stores and endpoints in configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a client cannot be created or a configured seed is
    /// invalid.
    pub fn from_config(config: &DmpConfig, shutdown_signal: watch::Receiver<bool>) -> Result<Self> {
        let catalog = SyncCatalog::from_config(config)?;
        let transports = create_transports(&config.destinations)?;

        if transports.is_empty() {
            tracing::warn!("No destination is enabled; every upload will be skipped");
        }

        Ok(Self::new(
            catalog,
            transports,
            SyncOptions::from_config(config),
            config.sync.max_concurrent_audiences,
            shutdown_signal,
        ))
    }

    /// Restrict the run to the given audiences
    pub fn with_audience_filter(mut self, names: impl IntoIterator<Item = AudienceName>) -> Self {
        let names: BTreeSet<_> = names.into_iter().collect();
        self.audience_filter = (!names.is_empty()).then_some(names);
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.options.dry_run = dry_run;
        self
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    pub fn catalog(&self) -> &SyncCatalog {
        &self.catalog
    }

    /// Execute the sync
    ///
    /// Audiences are started until the pending list is exhausted or a
    /// shutdown is signalled; audiences already started always complete.
    ///
    /// # Errors
    ///
    /// Returns an error only if the pending audiences cannot be listed.
    /// Per-audience failures are reported in the summary.
    pub async fn execute_sync(&self) -> Result<SyncSummary> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("sync", run_id = %run_id);
        self.run(run_id).instrument(span).await
    }

    async fn run(&self, run_id: Uuid) -> Result<SyncSummary> {
        let start_time = Instant::now();
        let mut summary = SyncSummary::new(run_id, self.options.dry_run);

        crate::log_sync_start!(run_id, self.options.dry_run, self.max_concurrency);

        let filter = self.audience_filter.as_ref();
        let pending = self
            .catalog
            .list_pending()
            .await?
            .filter(|name| filter.map_or(true, |names| names.contains(name)));

        // Set only when an audience was left unstarted because of shutdown
        let cut_short = AtomicBool::new(false);
        let shutdown = self.shutdown_signal.clone();
        let cut_short_flag = &cut_short;
        let mut reports = stream::iter(pending)
            .take_while(move |_| {
                let stop = *shutdown.borrow();
                if stop {
                    tracing::warn!("Shutdown requested, not starting further audiences");
                    cut_short_flag.store(true, Ordering::SeqCst);
                }
                futures::future::ready(!stop)
            })
            .map(|name| {
                let span = tracing::info_span!("audience", audience = %name);
                self.process_audience(name).instrument(span)
            })
            .buffer_unordered(self.max_concurrency);

        while let Some(report) = reports.next().await {
            summary.record(report);
        }

        summary.interrupted = cut_short.load(Ordering::SeqCst);

        if let Some(names) = filter {
            if !summary.interrupted {
                let seen: BTreeSet<&AudienceName> =
                    summary.audiences.iter().map(|report| &report.name).collect();
                let missing: Vec<String> = names
                    .iter()
                    .filter(|name| !seen.contains(name))
                    .map(|name| name.to_string())
                    .collect();
                for name in missing {
                    summary.add_error(
                        SyncError::new(SyncErrorType::NotFound, "Audience not found")
                            .with_context(format!("audience={name}")),
                    );
                }
            }
        }

        let mut summary = summary.with_duration(start_time.elapsed());
        summary.audiences.sort_by(|a, b| a.name.cmp(&b.name));
        summary.log_summary();

        Ok(summary)
    }

    async fn process_audience(&self, name: AudienceName) -> AudienceReport {
        let started = Instant::now();
        let mut audience = match self.catalog.load(&name).await {
            Ok(audience) => audience,
            Err(e) => {
                crate::log_error_with_context!(&e, "Skipping audience, persisted state left untouched");
                let error = SyncError::new(load_error_type(&e), e.to_string())
                    .with_context(format!("audience={name}"));
                return AudienceReport::failed(name, Vec::new(), error);
            }
        };

        let outcomes = audience.sync(&self.transports, &self.options).await;

        if self.options.dry_run {
            tracing::info!(records = audience.members().len(), "Dry run, state not persisted");
            return AudienceReport::synced(name, outcomes);
        }

        match self.catalog.persist(&audience).await {
            Ok(()) => {
                crate::log_audience_complete!(audience.members().len(), started.elapsed());
                AudienceReport::synced(name, outcomes)
            }
            Err(e) => {
                crate::log_error_with_context!(&e, "Failed to persist audience");
                let error = SyncError::new(SyncErrorType::Persist, e.to_string())
                    .with_context(format!("audience={name}"));
                AudienceReport::failed(name, outcomes, error)
            }
        }
    }
}

fn load_error_type(error: &DmpError) -> SyncErrorType {
    match error {
        DmpError::Source(_) => SyncErrorType::Fetch,
        DmpError::Destination(_) => SyncErrorType::Configuration,
        _ => SyncErrorType::Load,
    }
}
