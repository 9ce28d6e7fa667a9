//! Test Index Manager
//!
//! Provides isolated index storage for testing:
//! - Temporary index files that are automatically cleaned up
//! - Pre-seeded snapshots
//! - Coordinators wired to a manual clock and fast retries

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use searchlight_core::{
    IndexLocation, ManualClock, OfflineIndex, RemoteSource, RetryConfig, SearchConfig,
    SearchCoordinator, SearchResult, SqlitePreferences,
};
use tempfile::TempDir;

/// Configuration that fails fast: two attempts, 1 ms backoff, 200 ms timeout
pub fn fast_config(location: IndexLocation) -> SearchConfig {
    let mut config = SearchConfig::new();
    config.retry = RetryConfig {
        max_attempts: 2,
        delay: Duration::from_millis(1),
        backoff_factor: 1.0,
    };
    config.fetch_timeout = Some(Duration::from_millis(200));
    config.index_location = location;
    config
}

/// Manager for test indexes
///
/// Each manager owns a temporary directory holding the index file and the
/// preference table. Everything is deleted when the manager is dropped.
///
/// # Example
///
/// ```rust,ignore
/// let env = TestIndexManager::new_temp();
/// env.seed(TestDataFactory::corpus()).await;
///
/// let coordinator = env.coordinator(Arc::new(TestSource::offline()));
/// let response = coordinator.search(&SearchParams::query("budget")).await?;
/// ```
pub struct TestIndexManager {
    /// Handle on the offline index
    pub index: OfflineIndex,
    /// Persistent preferences (search history)
    pub preferences: Arc<SqlitePreferences>,
    /// Clock shared with every coordinator built here
    pub clock: Arc<ManualClock>,
    location: IndexLocation,
    temp_dir: TempDir,
}

impl TestIndexManager {
    /// Create a new index in a temporary directory
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let location = IndexLocation::in_dir(temp_dir.path());
        let preferences =
            SqlitePreferences::open(&location).expect("Failed to open test preferences");
        let start = Utc
            .with_ymd_and_hms(2024, 6, 1, 9, 0, 0)
            .single()
            .expect("valid start time");

        Self {
            index: OfflineIndex::new(location.clone()),
            preferences: Arc::new(preferences),
            clock: Arc::new(ManualClock::new(start)),
            location,
            temp_dir,
        }
    }

    pub fn location(&self) -> &IndexLocation {
        &self.location
    }

    /// The temporary directory backing this manager
    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path to the index file
    pub fn path(&self) -> PathBuf {
        match &self.location {
            IndexLocation::File(path) => path.clone(),
            IndexLocation::InMemory => PathBuf::from(":memory:"),
        }
    }

    /// Replace the snapshot with `results`
    pub async fn seed(&self, results: Vec<SearchResult>) -> usize {
        self.index
            .build_index(results)
            .await
            .expect("Failed to seed index")
    }

    pub async fn record_count(&self) -> usize {
        self.index.count().await.unwrap_or(0)
    }

    /// Coordinator over `source` with [`fast_config`] and the manual clock
    pub fn coordinator(&self, source: Arc<dyn RemoteSource>) -> SearchCoordinator {
        self.coordinator_with(source, fast_config(self.location.clone()))
    }

    pub fn coordinator_with(
        &self,
        source: Arc<dyn RemoteSource>,
        config: SearchConfig,
    ) -> SearchCoordinator {
        let index = OfflineIndex::new(config.index_location.clone());
        SearchCoordinator::new(source, index, self.preferences.clone())
            .with_config(config)
            .with_clock(self.clock.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::TestDataFactory;

    #[tokio::test]
    async fn test_temp_index_creation() {
        let env = TestIndexManager::new_temp();
        assert_eq!(env.record_count().await, 0);
        assert!(env.path().starts_with(env.dir()));
    }

    #[tokio::test]
    async fn test_seed_replaces_snapshot() {
        let env = TestIndexManager::new_temp();
        assert_eq!(env.seed(TestDataFactory::create_batch(12)).await, 12);
        assert_eq!(env.seed(TestDataFactory::create_batch(3)).await, 3);
        assert_eq!(env.record_count().await, 3);
        assert!(env.path().exists());
    }
}
