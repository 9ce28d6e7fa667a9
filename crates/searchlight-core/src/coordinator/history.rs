//! Search history
//!
//! A JSON array of `SearchHistoryEntry` in one preference slot. Writers are
//! last-write-wins; nothing merges concurrent updates.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::config::HistoryConfig;
use crate::model::SearchHistoryEntry;
use crate::recovery::{Result, SearchError};
use crate::storage::PreferenceStore;

/// Persisted query history backing suggestions
#[derive(Clone)]
pub struct SearchHistory {
    store: Arc<dyn PreferenceStore>,
    config: HistoryConfig,
}

impl SearchHistory {
    pub fn new(store: Arc<dyn PreferenceStore>, config: HistoryConfig) -> Self {
        Self { store, config }
    }

    pub(crate) fn store(&self) -> Arc<dyn PreferenceStore> {
        Arc::clone(&self.store)
    }

    /// Stored entries; an unreadable slot counts as empty
    pub fn load(&self) -> Result<Vec<SearchHistoryEntry>> {
        let Some(raw) = self.store.get(&self.config.storage_key)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!("Discarding unreadable search history: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, entries: &[SearchHistoryEntry]) -> Result<()> {
        let raw = serde_json::to_string(entries).map_err(|e| {
            SearchError::search("Could not serialize search history").with_details(e.to_string())
        })?;
        self.store.set(&self.config.storage_key, &raw)?;
        Ok(())
    }

    /// Count one use of `query` at `now`
    ///
    /// Blank queries are ignored. Past `max_entries`, the least recently used
    /// queries are dropped.
    pub fn record(&self, query: &str, now: DateTime<Utc>) -> Result<()> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }

        let mut entries = self.load()?;
        let lower = query.to_lowercase();
        match entries.iter_mut().find(|e| e.query.to_lowercase() == lower) {
            Some(entry) => {
                entry.query = query.to_string();
                entry.count = entry.count.saturating_add(1);
                entry.timestamp = now;
            }
            None => entries.push(SearchHistoryEntry {
                query: query.to_string(),
                timestamp: now,
                count: 1,
            }),
        }

        if entries.len() > self.config.max_entries {
            entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            entries.truncate(self.config.max_entries);
        }

        self.save(&entries)
    }

    pub fn clear(&self) -> Result<()> {
        self.save(&[])
    }
}
