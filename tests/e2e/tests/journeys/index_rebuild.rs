//! Journey: keeping the offline snapshot fresh
//!
//! 1. A rebuild replaces the whole snapshot with the source's universe
//! 2. An unreachable source keeps the previous snapshot and says so
//! 3. A rejected fetch or an unreadable index is an error
//! 4. Records survive a round trip through the index unchanged

use std::sync::Arc;

use searchlight_core::{ErrorKind, IndexLocation, OfflineIndex, SearchParams};
use searchlight_e2e_tests::{
    SourceBehavior, TestDataFactory, TestIndexManager, TestSource, fast_config,
};

#[tokio::test]
async fn test_rebuild_indexes_the_universe() {
    let env = TestIndexManager::new_temp();
    let source = Arc::new(TestSource::online(TestDataFactory::corpus()));
    let coordinator = env.coordinator(source);

    let summary = coordinator.build_search_index().await.unwrap();
    assert_eq!(summary.indexed, 8);
    assert!(!summary.preserved_previous);
    assert_eq!(env.record_count().await, 8);
}

#[tokio::test]
async fn test_rebuild_replaces_previous_snapshot() {
    let env = TestIndexManager::new_temp();
    env.seed(TestDataFactory::create_batch(50)).await;

    let source = Arc::new(TestSource::online(TestDataFactory::corpus()));
    let coordinator = env.coordinator(source.clone());
    coordinator.build_search_index().await.unwrap();
    assert_eq!(env.record_count().await, 8);

    source.set_results(TestDataFactory::corpus().into_iter().take(3).collect());
    let summary = coordinator.build_search_index().await.unwrap();
    assert_eq!(summary.indexed, 3);
    assert!(env.index.get("batch-0").await.unwrap().is_none());
}

#[tokio::test]
async fn test_unreachable_source_preserves_snapshot() {
    let env = TestIndexManager::new_temp();
    env.seed(TestDataFactory::corpus()).await;

    let source = Arc::new(TestSource::online(Vec::new()));
    source.set_behavior(SourceBehavior::Offline);
    let coordinator = env.coordinator(source);

    let summary = coordinator.build_search_index().await.unwrap();
    assert!(summary.preserved_previous);
    assert_eq!(summary.indexed, 8);

    // The preserved snapshot still answers searches
    let response = coordinator.search(&SearchParams::query("garden")).await.unwrap();
    assert_eq!(response.results[0].id, "garden");
}

#[tokio::test]
async fn test_broken_source_fails_rebuild_and_keeps_snapshot() {
    let env = TestIndexManager::new_temp();
    env.seed(TestDataFactory::corpus()).await;

    let source = Arc::new(TestSource::online(TestDataFactory::create_batch(3)));
    source.set_behavior(SourceBehavior::Broken);
    let coordinator = env.coordinator(source.clone());

    let err = coordinator.build_search_index().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Search);
    assert_eq!(source.calls(), 1);
    assert_eq!(env.record_count().await, 8);
}

#[tokio::test]
async fn test_unopenable_index_fails_rebuild() {
    let env = TestIndexManager::new_temp();
    let blocker = env.dir().join("blocker");
    std::fs::write(&blocker, b"file").unwrap();
    let config = fast_config(IndexLocation::File(blocker.join("index.db")));

    let coordinator = env.coordinator_with(
        Arc::new(TestSource::online(TestDataFactory::corpus())),
        config,
    );
    let err = coordinator.build_search_index().await.unwrap_err();

    // The write fails, then so does reading back the previous snapshot
    assert_eq!(err.kind, ErrorKind::Search);
    assert!(err.details.is_some());
}

#[tokio::test]
async fn test_records_round_trip_with_metadata() {
    let env = TestIndexManager::new_temp();
    let corpus = TestDataFactory::corpus();
    env.seed(corpus.clone()).await;

    let stored = env.index.get("offsite").await.unwrap().unwrap();
    assert_eq!(stored, corpus[2]);

    let records = env.index.records().await.unwrap();
    let offsite = records
        .iter()
        .find(|r| r.result.id == "offsite")
        .unwrap();
    assert!(offsite.searchable_text.contains("lisbon"));
    assert!(offsite.searchable_text.contains("offsite agenda"));
}

#[tokio::test]
async fn test_snapshot_persists_across_handles() {
    let env = TestIndexManager::new_temp();
    env.seed(TestDataFactory::corpus()).await;

    let reopened = OfflineIndex::new(env.location().clone());
    assert_eq!(reopened.count().await.unwrap(), 8);

    reopened.clear_index().await.unwrap();
    assert_eq!(env.record_count().await, 0);
}
