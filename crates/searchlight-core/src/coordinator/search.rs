//! Search Coordinator
//!
//! The public façade. One call to `search`:
//! validate -> cache lookup -> delegate fetch (timeout + retry)
//! -> fuzzy refine -> filters -> limit -> cache write -> stats.
//! A recoverable delegate failure is answered from the offline index, or
//! from the last-known-good set when the index is unavailable too.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info};

use super::clock::{Clock, SystemClock};
use super::history::SearchHistory;
use super::source::RemoteSource;
use crate::config::SearchConfig;
use crate::fuzzy::FuzzyMatcher;
use crate::model::{
    IndexSummary, ResultOrigin, SearchHistoryEntry, SearchParams, SearchResponse, SearchResult,
    SearchStats,
};
use crate::optimize::{BoundedCache, CompiledFilter, apply_filters, limit_results, optimize_search};
use crate::recovery::{
    ErrorKind, Result, SearchError, handle_sync_error, log_error, recover_from_search_error,
    retry_when, validate_search_params,
};
use crate::storage::{OfflineIndex, PreferenceStore};

/// A cached result set and the instant it stops being served
#[derive(Debug, Clone)]
struct CacheEntry {
    results: Vec<SearchResult>,
    expires_at: DateTime<Utc>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Search façade over a remote source, the offline index and search history
///
/// All methods take `&self`; share it behind an `Arc`.
pub struct SearchCoordinator {
    source: Arc<dyn RemoteSource>,
    index: OfflineIndex,
    history: SearchHistory,
    matcher: FuzzyMatcher,
    clock: Arc<dyn Clock>,
    config: SearchConfig,
    cache: Mutex<BoundedCache<CacheEntry>>,
    last_good: Mutex<BoundedCache<Vec<SearchResult>>>,
}

impl SearchCoordinator {
    /// Coordinator with default configuration and the system clock
    pub fn new(
        source: Arc<dyn RemoteSource>,
        index: OfflineIndex,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        let config = SearchConfig::new();
        Self {
            source,
            index,
            history: SearchHistory::new(preferences, config.history.clone()),
            matcher: FuzzyMatcher::with_config(config.fuzzy.clone()),
            clock: Arc::new(SystemClock),
            cache: Mutex::new(BoundedCache::new(config.cache.capacity)),
            last_good: Mutex::new(BoundedCache::new(config.cache.capacity)),
            config,
        }
    }

    /// Replace the configuration; cached results are dropped
    ///
    /// The fuzzy settings apply to the offline index as well.
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.history = SearchHistory::new(self.history.store(), config.history.clone());
        self.matcher = FuzzyMatcher::with_config(config.fuzzy.clone());
        self.index.set_matcher(FuzzyMatcher::with_config(config.fuzzy.clone()));
        self.cache = Mutex::new(BoundedCache::new(config.cache.capacity));
        self.last_good = Mutex::new(BoundedCache::new(config.cache.capacity));
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn index(&self) -> &OfflineIndex {
        &self.index
    }

    // ========================================================================
    // SEARCH
    // ========================================================================

    /// Run a search, degrading to offline or stale data on recoverable failures
    pub async fn search(&self, params: &SearchParams) -> Result<SearchResponse> {
        let started = Instant::now();

        let filters = validate_search_params(params).inspect_err(log_error)?;

        if let Err(err) = self.history.record(&params.query, self.clock.now()) {
            log_error(&err);
        }

        let key = params.cache_key();
        if let Some(results) = self.cached(&key) {
            debug!(query = %params.query, "Cache hit");
            return Ok(self.respond(results, params, started, ResultOrigin::Cache));
        }
        debug!(query = %params.query, "Cache miss");

        match self.fetch_live(params).await {
            Ok(candidates) => {
                let refined =
                    optimize_search(&self.matcher, candidates, params, &self.config.optimizer).await;
                let results = Self::finish(refined, &filters, params);
                self.remember(key, &results);
                Ok(self.respond(results, params, started, ResultOrigin::Live))
            }
            Err(err) => {
                let (fallback, origin) = if err.kind.is_transient() {
                    self.degraded_results(params, &filters, &key).await
                } else {
                    (Vec::new(), ResultOrigin::Live)
                };
                let results = recover_from_search_error(err, fallback, params)?;
                Ok(self.respond(results, params, started, origin))
            }
        }
    }

    /// One delegate fetch bounded by the fetch timeout, retried while transient
    async fn fetch_live(&self, params: &SearchParams) -> Result<Vec<SearchResult>> {
        let timeout = self.config.fetch_timeout;
        let source = &self.source;

        retry_when(
            || async move {
                let Some(limit) = timeout else {
                    return source.fetch(params).await;
                };
                match tokio::time::timeout(limit, source.fetch(params)).await {
                    Ok(fetched) => fetched,
                    Err(_) => Err(SearchError::timeout(format!(
                        "Search request timed out after {} ms",
                        limit.as_millis()
                    ))),
                }
            },
            &self.config.retry,
            |err: &SearchError| err.kind.is_transient(),
        )
        .await
    }

    /// Offline results for `params`, else the last-known-good set for `key`
    async fn degraded_results(
        &self,
        params: &SearchParams,
        filters: &[CompiledFilter],
        key: &str,
    ) -> (Vec<SearchResult>, ResultOrigin) {
        match self.index.search(params).await {
            Ok(offline) => (Self::finish(offline, filters, params), ResultOrigin::Offline),
            Err(err) => {
                log_error(&SearchError::from(err));
                let stale = lock(&self.last_good).get(key).cloned().unwrap_or_default();
                (stale, ResultOrigin::Stale)
            }
        }
    }

    fn finish(
        results: Vec<SearchResult>,
        filters: &[CompiledFilter],
        params: &SearchParams,
    ) -> Vec<SearchResult> {
        let filtered = apply_filters(results, filters);
        match params.limit {
            Some(limit) => limit_results(filtered, limit),
            None => filtered,
        }
    }

    fn respond(
        &self,
        results: Vec<SearchResult>,
        params: &SearchParams,
        started: Instant,
        origin: ResultOrigin,
    ) -> SearchResponse {
        SearchResponse {
            stats: SearchStats {
                total_results: results.len(),
                filter_count: params.filters.len(),
                search_time_ms: started.elapsed().as_secs_f64() * 1000.0,
                cached: origin == ResultOrigin::Cache,
                origin,
            },
            results,
        }
    }

    // ========================================================================
    // CACHE
    // ========================================================================

    fn cached(&self, key: &str) -> Option<Vec<SearchResult>> {
        let now = self.clock.now();
        let mut cache = lock(&self.cache);

        let expired = match cache.get(key) {
            Some(entry) if entry.expires_at > now => return Some(entry.results.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            debug!("Cache entry expired");
            cache.remove(key);
        }
        None
    }

    /// Cache a live result set and keep it as last-known-good
    fn remember(&self, key: String, results: &[SearchResult]) {
        let ttl = TimeDelta::from_std(self.config.cache.ttl).unwrap_or(TimeDelta::MAX);
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        lock(&self.cache).insert(
            key.clone(),
            CacheEntry {
                results: results.to_vec(),
                expires_at,
            },
        );
        lock(&self.last_good).insert(key, results.to_vec());
    }

    /// Drop every TTL cache entry; the offline index and last-known-good data stay
    pub fn clear_cache(&self) {
        lock(&self.cache).clear();
        debug!("Search cache cleared");
    }

    /// Entries currently held in the TTL cache, expired or not
    pub fn cached_entries(&self) -> usize {
        lock(&self.cache).len()
    }

    // ========================================================================
    // OFFLINE INDEX
    // ========================================================================

    /// Rebuild the offline index from the source's full result universe
    ///
    /// An unreachable source keeps the previous snapshot. Any other source
    /// error is returned unchanged.
    pub async fn build_search_index(&self) -> Result<IndexSummary> {
        match self.source.fetch_universe().await {
            Ok(universe) => self.build_search_index_from(universe).await,
            Err(err)
                if matches!(err.kind, ErrorKind::Network | ErrorKind::Timeout | ErrorKind::Sync) =>
            {
                let err = SearchError::sync("Could not fetch the result universe")
                    .with_details(err.to_string());
                self.preserve_previous(err).await
            }
            Err(err) => {
                log_error(&err);
                Err(err)
            }
        }
    }

    /// Replace the offline snapshot with `results`
    ///
    /// A failed write keeps the previous snapshot and reports it in the summary.
    pub async fn build_search_index_from(&self, results: Vec<SearchResult>) -> Result<IndexSummary> {
        match self.index.build_index(results).await {
            Ok(indexed) => {
                info!("Offline index rebuilt ({} records)", indexed);
                Ok(IndexSummary {
                    indexed,
                    preserved_previous: false,
                })
            }
            Err(err) => self.preserve_previous(SearchError::from_sync_failure(err)).await,
        }
    }

    /// Recover from a sync failure, reporting the snapshot still in place
    ///
    /// Fails when the previous snapshot cannot be read either.
    async fn preserve_previous(&self, err: SearchError) -> Result<IndexSummary> {
        handle_sync_error(err, Vec::new())?;
        let indexed = self
            .index
            .count()
            .await
            .map_err(SearchError::from)
            .inspect_err(log_error)?;
        Ok(IndexSummary {
            indexed,
            preserved_previous: true,
        })
    }

    // ========================================================================
    // HISTORY
    // ========================================================================

    /// Past queries matching `partial`, best first
    pub async fn suggest_queries(&self, partial: &str) -> Result<Vec<String>> {
        let history = self.search_history().await?;
        Ok(self.matcher.suggest_queries(partial, &history))
    }

    pub async fn search_history(&self) -> Result<Vec<SearchHistoryEntry>> {
        self.history.load().inspect_err(log_error)
    }

    pub async fn clear_history(&self) -> Result<()> {
        self.history.clear().inspect_err(log_error)
    }
}
