//! Performance Optimizer
//!
//! Helpers that keep large result sets cheap to handle:
//! - Compiled filters (`compile_filters`, `optimize_filters`)
//! - Background fuzzy refinement (`optimize_search`)
//! - Bounded result cache, batching, windowing, trimming
//! - Debounced callbacks

mod cache;
mod debounce;
mod executor;
mod filters;

pub use cache::{BoundedCache, cache_results};
pub use debounce::{Debounced, debounce};
pub use executor::{InlineExecutor, MatchExecutor, ParallelExecutor, optimize_search};
pub use filters::{
    CompareOp, CompiledFilter, FieldRef, apply_filters, compile_filter, compile_filters,
    optimize_filters, parse_date,
};

use crate::model::SearchResult;

/// Content kept by `optimize_memory`, in characters
pub const MAX_CONTENT_CHARS: usize = 500;

/// Description kept by `optimize_memory`, in characters
pub const MAX_DESCRIPTION_CHARS: usize = 200;

// ============================================================================
// BATCHING
// ============================================================================

/// A restartable view of `items` in fixed-size chunks
///
/// Every iteration yields the same batches in the same order; only the last
/// one may be short.
pub struct Batches<'a, T> {
    items: &'a [T],
    size: usize,
}

impl<'a, T> Batches<'a, T> {
    pub fn iter(&self) -> std::slice::Chunks<'a, T> {
        self.items.chunks(self.size)
    }

    /// Number of batches
    pub fn len(&self) -> usize {
        self.items.len().div_ceil(self.size)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn batch_size(&self) -> usize {
        self.size
    }
}

impl<T> Clone for Batches<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Batches<'_, T> {}

impl<'a, T> IntoIterator for Batches<'a, T> {
    type Item = &'a [T];
    type IntoIter = std::slice::Chunks<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &Batches<'a, T> {
    type Item = &'a [T];
    type IntoIter = std::slice::Chunks<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Split `items` into batches of `batch_size` (zero is treated as one)
pub fn process_in_batches<T>(items: &[T], batch_size: usize) -> Batches<'_, T> {
    Batches {
        items,
        size: batch_size.max(1),
    }
}

// ============================================================================
// WINDOWING
// ============================================================================

/// First `limit` results
pub fn limit_results<T>(mut results: Vec<T>, limit: usize) -> Vec<T> {
    results.truncate(limit);
    results
}

/// Results in `[start, end)`, clamped to bounds; empty when `start >= end`
pub fn get_visible_results<T>(results: &[T], start: usize, end: usize) -> &[T] {
    let end = end.min(results.len());
    let start = start.min(end);
    &results[start..end]
}

// ============================================================================
// TRIMMING
// ============================================================================

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Copies with content cut to 500 chars and description to 200
///
/// A missing description becomes an empty one. Everything else is kept.
pub fn optimize_memory(results: &[SearchResult]) -> Vec<SearchResult> {
    results
        .iter()
        .map(|r| {
            let mut trimmed = r.clone();
            trimmed.content = truncate_chars(&r.content, MAX_CONTENT_CHARS);
            trimmed.metadata.description = Some(truncate_chars(
                r.metadata.description.as_deref().unwrap_or_default(),
                MAX_DESCRIPTION_CHARS,
            ));
            trimmed
        })
        .collect()
}
