//! Bounded result cache
//!
//! Capacity-limited map that evicts the oldest inserted key. Reads use
//! `peek`, so lookups never change eviction order; re-inserting a key makes
//! it the newest again.

use std::num::NonZeroUsize;

use lru::LruCache;

use crate::config::DEFAULT_CACHE_CAPACITY;
use crate::model::SearchResult;

/// String-keyed map holding at most `capacity` entries
pub struct BoundedCache<V> {
    entries: LruCache<String, V>,
}

impl<V> BoundedCache<V> {
    /// A capacity of zero is treated as one
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Insert or replace; returns the entry evicted to make room, if any
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<(String, V)> {
        let key = key.into();
        let evicted = if !self.entries.contains(&key) && self.entries.len() >= self.capacity() {
            self.entries.pop_lru()
        } else {
            None
        };
        self.entries.put(key, value);
        evicted
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.peek(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.pop(key)
    }

    /// Keys from oldest to newest
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.iter().rev().map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<V> Default for BoundedCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl<V> std::fmt::Debug for BoundedCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

/// Store `results` under `key`, evicting the oldest entry when full
pub fn cache_results(
    cache: &mut BoundedCache<Vec<SearchResult>>,
    key: impl Into<String>,
    results: Vec<SearchResult>,
) {
    cache.insert(key, results);
}
