//! # Searchlight Core
//!
//! Resilient search over a remote result source:
//!
//! - **Fuzzy matching**: substring and edit-distance scoring, stable ranking,
//!   literal highlight spans, query suggestions from history
//! - **Offline index**: SQLite snapshot of the result universe, replaced
//!   atomically, searched when the live source is unavailable
//! - **TTL cache**: bounded, key-exact, time-limited result cache
//! - **Error recovery**: typed error classes, retry with backoff, automatic
//!   fallback to offline or last-known-good results
//! - **Optimizer**: compiled filters, parallel refinement, batching,
//!   windowing, payload trimming, debouncing
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use searchlight_core::prelude::*;
//!
//! let source = Arc::new(StaticSource::new(vec![
//!     SearchResult::new("1", "Quarterly budget review", "Budget"),
//! ]));
//! let coordinator = SearchCoordinator::new(
//!     source,
//!     OfflineIndex::in_memory(),
//!     Arc::new(MemoryPreferences::new()),
//! );
//!
//! coordinator.build_search_index().await?;
//! let response = coordinator.search(&SearchParams::query("budgt")).await?;
//! println!("{} results in {:.1} ms", response.stats.total_results, response.stats.search_time_ms);
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod config;
pub mod coordinator;
pub mod fuzzy;
pub mod model;
pub mod optimize;
pub mod recovery;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use config::{
    CacheConfig, FuzzyConfig, HistoryConfig, IndexLocation, OptimizerConfig, RetryConfig,
    SearchConfig,
};
pub use coordinator::{
    Clock, ManualClock, RemoteSource, SearchCoordinator, SearchHistory, StaticSource, SystemClock,
};
pub use fuzzy::{FuzzyMatcher, highlight_matches};
pub use model::{
    Filter, FilterOperator, FilterValue, Highlight, IndexSummary, MatchSpan, ResultMetadata,
    ResultOrigin, Scalar, SearchHistoryEntry, SearchParams, SearchResponse, SearchResult,
    SearchStats,
};
pub use optimize::{
    Batches, BoundedCache, Debounced, cache_results, debounce, get_visible_results,
    limit_results, optimize_filters, optimize_memory, optimize_search, process_in_batches,
};
pub use recovery::{
    ErrorKind, SearchError, handle_sync_error, log_error, recover_from_search_error, retry,
    validate_search_params, validate_search_params_value,
};
pub use storage::{
    IndexError, IndexedRecord, MemoryPreferences, OfflineIndex, PreferenceStore,
    SqlitePreferences,
};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        ErrorKind, Filter, FilterOperator, MemoryPreferences, OfflineIndex, RemoteSource,
        ResultOrigin, SearchConfig, SearchCoordinator, SearchError, SearchParams,
        SearchResponse, SearchResult, StaticSource,
    };
}
