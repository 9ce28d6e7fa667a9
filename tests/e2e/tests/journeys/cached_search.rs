//! Journey: repeated searches against a healthy source
//!
//! 1. First search goes live and populates the cache
//! 2. Identical (case-insensitive) searches are served from the cache
//! 3. Entries expire after the TTL, or on demand
//! 4. Filters and limits shape every response, cached or not

use std::sync::Arc;
use std::time::Duration;

use searchlight_core::{Filter, FilterOperator, ResultOrigin, SearchParams};
use searchlight_e2e_tests::{SourceBehavior, TestDataFactory, TestIndexManager, TestSource};

#[tokio::test]
async fn test_second_search_is_served_from_cache() {
    let env = TestIndexManager::new_temp();
    let source = Arc::new(TestSource::online(TestDataFactory::corpus()));
    let coordinator = env.coordinator(source.clone());

    let first = coordinator.search(&SearchParams::query("budget")).await.unwrap();
    assert_eq!(first.stats.origin, ResultOrigin::Live);
    assert!(!first.stats.cached);
    assert_eq!(first.results.len(), 2);

    let second = coordinator.search(&SearchParams::query("  BUDGET ")).await.unwrap();
    assert_eq!(second.stats.origin, ResultOrigin::Cache);
    assert!(second.stats.cached);
    assert_eq!(second.results, first.results);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_cache_expires_after_ttl() {
    let env = TestIndexManager::new_temp();
    let source = Arc::new(TestSource::online(TestDataFactory::corpus()));
    let coordinator = env.coordinator(source.clone());
    let ttl = coordinator.config().cache.ttl;
    let params = SearchParams::query("lisbon");

    coordinator.search(&params).await.unwrap();
    env.clock.advance(ttl - Duration::from_secs(1));
    let cached = coordinator.search(&params).await.unwrap();
    assert_eq!(cached.stats.origin, ResultOrigin::Cache);

    env.clock.advance(Duration::from_secs(1));
    let refreshed = coordinator.search(&params).await.unwrap();
    assert_eq!(refreshed.stats.origin, ResultOrigin::Live);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_clear_cache_forces_live_search() {
    let env = TestIndexManager::new_temp();
    let source = Arc::new(TestSource::online(TestDataFactory::corpus()));
    let coordinator = env.coordinator(source.clone());
    let params = SearchParams::query("garden");

    coordinator.search(&params).await.unwrap();
    assert_eq!(coordinator.cached_entries(), 1);

    coordinator.clear_cache();
    assert_eq!(coordinator.cached_entries(), 0);

    let response = coordinator.search(&params).await.unwrap();
    assert_eq!(response.stats.origin, ResultOrigin::Live);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_filters_are_part_of_the_cache_key() {
    let env = TestIndexManager::new_temp();
    let source = Arc::new(TestSource::online(TestDataFactory::corpus()));
    let coordinator = env.coordinator(source.clone());

    let everything = coordinator.search(&SearchParams::query("")).await.unwrap();
    assert_eq!(everything.results.len(), 8);

    let work = coordinator
        .search(&SearchParams::query("").with_filter(Filter::new(
            "category",
            FilterOperator::Equals,
            "work",
        )))
        .await
        .unwrap();
    assert_eq!(work.stats.origin, ResultOrigin::Live);
    assert_eq!(work.stats.filter_count, 1);
    let ids: Vec<&str> = work.results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["budget-q1", "budget-q2", "retro", "roadmap"]);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_date_range_and_limit() {
    let env = TestIndexManager::new_temp();
    let source = Arc::new(TestSource::online(TestDataFactory::corpus()));
    let coordinator = env.coordinator(source);

    let params = SearchParams::query("")
        .with_filter(Filter::date_between("date", "2024-03-01", "2024-03-31"))
        .with_limit(1);
    let response = coordinator.search(&params).await.unwrap();

    assert_eq!(response.stats.total_results, 1);
    assert_eq!(response.results[0].id, "offsite");
}

#[tokio::test]
async fn test_fuzzy_query_ranks_and_highlights() {
    let env = TestIndexManager::new_temp();
    let source = Arc::new(TestSource::online(TestDataFactory::corpus()));
    let coordinator = env.coordinator(source);

    let response = coordinator.search(&SearchParams::query("roadmap")).await.unwrap();
    assert_eq!(response.results[0].id, "roadmap");

    let top = &response.results[0];
    assert!(top.fuzzy_score.unwrap_or(0.0) >= 0.8);
    let content = top
        .highlights
        .iter()
        .find(|h| h.field == "content")
        .expect("content highlight");
    assert_eq!(content.matches[0].text, "roadmap");
}

#[tokio::test]
async fn test_slow_source_times_out_and_falls_back() {
    let env = TestIndexManager::new_temp();
    env.seed(TestDataFactory::corpus()).await;

    let source = Arc::new(TestSource::online(TestDataFactory::corpus()));
    source.set_behavior(SourceBehavior::Slow(Duration::from_millis(500)));
    let coordinator = env.coordinator(source.clone());

    let response = coordinator.search(&SearchParams::query("budget")).await.unwrap();
    assert_eq!(response.stats.origin, ResultOrigin::Offline);
    assert_eq!(response.results.len(), 2);
    assert_eq!(source.calls(), 2);
}
