//! Integration tests for dry run mode
//!
//! A dry run builds every payload that a real run would send, but performs
//! no upload and writes nothing to the object store.

mod common;

use common::{member_data, store_with, CountingTransport, FixedSource};
use dmp_sync::adapters::destination::TransportRegistry;
use dmp_sync::adapters::storage::ObjectStore;
use dmp_sync::core::audience::{SyncOptions, UploadOutcome};
use dmp_sync::core::catalog::{KeyLayout, SyncCatalog};
use dmp_sync::core::sync::SyncCoordinator;
use dmp_sync::domain::DestinationKind;
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::test]
async fn test_dry_run_builds_payloads_without_side_effects() {
    let store = store_with(&["Alpha", "Beta"]).await;
    let keys_before = store.keys().await;
    let writes_before = store.write_count();

    let source = Arc::new(FixedSource::new(member_data(&["a@example.com", "b@example.com"])));
    let adtech_a = Arc::new(CountingTransport::new("123456789"));
    let adtech_b = Arc::new(CountingTransport::new("0987654321"));

    let catalog = SyncCatalog::new(store.clone(), source.clone(), KeyLayout::default());
    let transports = TransportRegistry::new()
        .with(DestinationKind::AdtechA, adtech_a.clone())
        .with(DestinationKind::AdtechB, adtech_b.clone());
    let options = SyncOptions {
        dry_run: true,
        ..SyncOptions::default()
    };
    let (_tx, rx) = watch::channel(false);

    let summary = SyncCoordinator::new(catalog, transports, options, 2, rx)
        .execute_sync()
        .await
        .unwrap();

    assert!(summary.dry_run);
    assert!(summary.is_successful());
    assert_eq!(summary.total_audiences, 2);
    assert_eq!(summary.dry_run_payloads, 4);
    assert_eq!(summary.uploads_succeeded, 0);

    for report in &summary.audiences {
        for outcome in &report.outcomes {
            assert_eq!(outcome.outcome, UploadOutcome::DryRun { records: 2 });
        }
    }

    // Data was fetched to build payloads, but nothing was sent or stored
    assert_eq!(source.calls(), 2);
    assert_eq!(adtech_a.calls(), 0);
    assert_eq!(adtech_b.calls(), 0);
    assert_eq!(store.write_count(), writes_before);
    assert_eq!(store.keys().await, keys_before);
    assert!(store.get("data/Alpha.json.gz").await.unwrap().is_none());
}

#[tokio::test]
async fn test_real_run_after_dry_run_uploads() {
    let store = store_with(&["Alpha"]).await;
    let source = Arc::new(FixedSource::new(member_data(&["a@example.com"])));
    let adtech_a = Arc::new(CountingTransport::new("123456789"));

    let build = |dry_run: bool| {
        let catalog = SyncCatalog::new(store.clone(), source.clone(), KeyLayout::default());
        let transports = TransportRegistry::new().with(DestinationKind::AdtechA, adtech_a.clone());
        let (_tx, rx) = watch::channel(false);
        SyncCoordinator::new(catalog, transports, SyncOptions::default(), 1, rx).with_dry_run(dry_run)
    };

    let dry = build(true).execute_sync().await.unwrap();
    // Payloads are built for both destinations whether or not a transport exists
    assert_eq!(dry.dry_run_payloads, 2);
    assert_eq!(adtech_a.calls(), 0);

    let real = build(false).execute_sync().await.unwrap();
    assert!(!real.dry_run);
    assert_eq!(real.uploads_succeeded, 1);
    // adtechB has no transport registered
    assert_eq!(real.uploads_skipped, 1);
    assert_eq!(adtech_a.calls(), 1);
    assert!(store.get("state/Alpha.yml").await.unwrap().is_some());
    assert!(store.get("data/Alpha.json.gz").await.unwrap().is_some());
}
