//! Configuration
//!
//! Plain structs with sensible defaults. `SearchConfig::from_env()` layers
//! `SEARCHLIGHT_*` environment overrides on top.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default cache time-to-live
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Capacity of bounded result caches
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Key under which search history is persisted
pub const SEARCH_HISTORY_KEY: &str = "searchHistory";

/// File name of the offline index database
pub const INDEX_FILE_NAME: &str = "index.db";

// ============================================================================
// COMPONENT CONFIGS
// ============================================================================

/// Fuzzy matching thresholds
///
/// These are tuning constants, not protocol values.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyConfig {
    /// Minimum score for a result to survive refinement
    pub acceptance_threshold: f32,
    /// Lowest score a literal substring match can get
    pub substring_floor: f32,
    /// Upper bound of the edit-distance band (exclusive of substring matches)
    pub fuzzy_ceiling: f32,
    /// Maximum number of suggestions returned
    pub max_suggestions: usize,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 0.6,
            substring_floor: 0.8,
            fuzzy_ceiling: 0.8,
            max_suggestions: 5,
        }
    }
}

/// TTL result cache settings
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_CACHE_TTL,
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Retry with exponential backoff
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub delay: Duration,
    /// Multiplier applied to the delay after each failure
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(300),
            backoff_factor: 2.0,
        }
    }
}

/// Search history persistence
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryConfig {
    pub storage_key: String,
    /// Oldest (least recently used) queries are dropped past this size
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            storage_key: SEARCH_HISTORY_KEY.to_string(),
            max_entries: 100,
        }
    }
}

/// Throughput knobs
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    /// Offload large matching passes to a background pool
    pub use_worker: bool,
    /// Minimum candidate count before offloading
    pub parallel_threshold: usize,
    /// Chunk size for batched processing
    pub batch_size: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            use_worker: true,
            parallel_threshold: 256,
            batch_size: 100,
        }
    }
}

// ============================================================================
// INDEX LOCATION
// ============================================================================

/// Where the offline index lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexLocation {
    /// SQLite file on disk
    File(PathBuf),
    /// Private in-memory database (lost on drop)
    InMemory,
}

impl IndexLocation {
    /// Platform data directory, e.g. `~/.local/share/searchlight/index.db`
    pub fn default_file() -> Option<Self> {
        let dirs = ProjectDirs::from("com", "searchlight", "searchlight")?;
        Some(IndexLocation::File(dirs.data_dir().join(INDEX_FILE_NAME)))
    }

    /// Index file inside a caller-chosen directory
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        IndexLocation::File(dir.into().join(INDEX_FILE_NAME))
    }
}

impl Default for IndexLocation {
    fn default() -> Self {
        Self::default_file().unwrap_or(IndexLocation::InMemory)
    }
}

impl std::fmt::Display for IndexLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexLocation::File(path) => write!(f, "{}", path.display()),
            IndexLocation::InMemory => write!(f, ":memory:"),
        }
    }
}

// ============================================================================
// SEARCH CONFIG
// ============================================================================

/// Complete configuration for the search subsystem
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchConfig {
    pub fuzzy: FuzzyConfig,
    pub cache: CacheConfig,
    pub retry: RetryConfig,
    pub history: HistoryConfig,
    pub optimizer: OptimizerConfig,
    /// Upper bound on one delegate fetch
    pub fetch_timeout: Option<Duration>,
    pub index_location: IndexLocation,
}

impl SearchConfig {
    /// Defaults with a 10 second fetch timeout
    pub fn new() -> Self {
        Self {
            fetch_timeout: Some(Duration::from_secs(10)),
            ..Default::default()
        }
    }

    /// Defaults plus `SEARCHLIGHT_*` environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::new();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Apply overrides from any key lookup (the environment in production)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("SEARCHLIGHT_DATA_DIR").filter(|d| !d.is_empty()) {
            self.index_location = IndexLocation::in_dir(dir);
        }

        if let Some(secs) = lookup("SEARCHLIGHT_CACHE_TTL_SECS").and_then(|v| v.parse::<u64>().ok()) {
            self.cache.ttl = Duration::from_secs(secs);
        }

        if let Some(ms) = lookup("SEARCHLIGHT_FETCH_TIMEOUT_MS").and_then(|v| v.parse::<u64>().ok()) {
            self.fetch_timeout = if ms == 0 { None } else { Some(Duration::from_millis(ms)) };
        }

        if let Some(flag) = lookup("SEARCHLIGHT_USE_WORKER") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.optimizer.use_worker = true,
                "0" | "false" | "no" | "off" => self.optimizer.use_worker = false,
                other => tracing::warn!("Ignoring invalid SEARCHLIGHT_USE_WORKER value: {}", other),
            }
        }
    }
}
