//! Match executors
//!
//! Fuzzy refinement is CPU-bound. The executor decides where it runs; both
//! implementations produce identical output for identical input.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::OptimizerConfig;
use crate::fuzzy::{FuzzyMatcher, PreparedQuery};
use crate::model::{SearchParams, SearchResult};

/// Runs fuzzy refinement over a candidate set
pub trait MatchExecutor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Score, filter and rank `results` against `query`
    fn execute(
        &self,
        matcher: &FuzzyMatcher,
        query: &PreparedQuery,
        results: &[SearchResult],
    ) -> Vec<SearchResult>;
}

/// Refines on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl MatchExecutor for InlineExecutor {
    fn name(&self) -> &'static str {
        "inline"
    }

    fn execute(
        &self,
        matcher: &FuzzyMatcher,
        query: &PreparedQuery,
        results: &[SearchResult],
    ) -> Vec<SearchResult> {
        FuzzyMatcher::rank(matcher.refine_all(query, results))
    }
}

/// Refines across the rayon thread pool
///
/// `collect` keeps input order, so the stable rank sees the same sequence
/// as the inline path.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelExecutor;

impl MatchExecutor for ParallelExecutor {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn execute(
        &self,
        matcher: &FuzzyMatcher,
        query: &PreparedQuery,
        results: &[SearchResult],
    ) -> Vec<SearchResult> {
        let accepted: Vec<SearchResult> = results
            .par_iter()
            .filter_map(|r| matcher.refine(query, r))
            .collect();
        FuzzyMatcher::rank(accepted)
    }
}

/// Refine `results` against `params.query`, off the async runtime when configured
///
/// Small sets and disabled workers run inline. If the background task fails
/// the same work is redone inline, so callers always get a result.
pub async fn optimize_search(
    matcher: &FuzzyMatcher,
    results: Vec<SearchResult>,
    params: &SearchParams,
    options: &OptimizerConfig,
) -> Vec<SearchResult> {
    let Some(query) = PreparedQuery::new(&params.query) else {
        return results;
    };

    if !options.use_worker || results.len() < options.parallel_threshold {
        return InlineExecutor.execute(matcher, &query, &results);
    }

    let shared = Arc::new(results);
    let worker_results = Arc::clone(&shared);
    let worker_matcher = matcher.clone();
    let worker_query = query.clone();

    let outcome = tokio::task::spawn_blocking(move || {
        ParallelExecutor.execute(&worker_matcher, &worker_query, &worker_results)
    })
    .await;

    match outcome {
        Ok(refined) => {
            debug!(
                "Refined {} candidates in background, {} accepted",
                shared.len(),
                refined.len()
            );
            refined
        }
        Err(e) => {
            warn!("Background matching failed, refining inline: {}", e);
            InlineExecutor.execute(matcher, &query, &shared)
        }
    }
}
