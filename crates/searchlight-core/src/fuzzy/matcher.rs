//! Fuzzy Matcher
//!
//! Scores candidates against a query, drops those below the acceptance
//! threshold and ranks the rest. Two score bands:
//! - literal substring hits score at least `substring_floor` (0.8)
//! - edit-distance matches over word windows score below `fuzzy_ceiling`

use crate::config::FuzzyConfig;
use crate::model::{Highlight, SearchHistoryEntry, SearchParams, SearchResult};

use super::distance::similarity_at_least;
use super::highlight::highlight_matches;

// ============================================================================
// PREPARED QUERY
// ============================================================================

/// A query normalized once and reused across candidates
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    /// Original casing, whitespace-collapsed (used for highlighting)
    raw: String,
    /// Lowercased, whitespace-collapsed query
    text: String,
    chars: Vec<char>,
    word_count: usize,
}

impl PreparedQuery {
    /// `None` for an empty or whitespace-only query
    pub fn new(query: &str) -> Option<Self> {
        let raw = query.split_whitespace().collect::<Vec<_>>().join(" ");
        if raw.is_empty() {
            return None;
        }

        let text = raw.to_lowercase();
        Some(Self {
            word_count: text.split(' ').count(),
            raw,
            chars: text.chars().collect(),
            text,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

fn normalize_word(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric())
}

// ============================================================================
// MATCHER
// ============================================================================

/// Pure scoring, ranking and suggestion functions
#[derive(Debug, Clone, Default)]
pub struct FuzzyMatcher {
    config: FuzzyConfig,
}

impl FuzzyMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FuzzyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FuzzyConfig {
        &self.config
    }

    /// Score one text against a prepared query, in [0, 1]
    pub fn score_text(&self, query: &PreparedQuery, text: &str) -> f32 {
        if text.is_empty() {
            return 0.0;
        }

        let lower = text.to_lowercase();
        if lower.contains(query.as_str()) {
            let ratio = query.chars.len() as f32 / lower.chars().count().max(1) as f32;
            let floor = self.config.substring_floor;
            return (floor + (1.0 - floor) * ratio.min(1.0)).min(1.0);
        }

        let words: Vec<&str> = lower
            .split_whitespace()
            .map(normalize_word)
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            return 0.0;
        }

        // Windows that cannot reach the acceptance threshold are skipped cheaply
        let needed = if self.config.fuzzy_ceiling > 0.0 {
            self.config.acceptance_threshold / self.config.fuzzy_ceiling
        } else {
            1.0
        };

        let span = query.word_count.min(words.len());
        let mut best = 0.0_f32;
        for window in words.windows(span) {
            let candidate: Vec<char> = window.join(" ").chars().collect();
            if let Some(score) = similarity_at_least(&query.chars, &candidate, needed.max(best)) {
                best = score;
            }
            if best >= 1.0 {
                break;
            }
        }

        // Keep edit-distance matches strictly below the substring band
        (self.config.fuzzy_ceiling * best).min(self.config.substring_floor - f32::EPSILON)
    }

    /// Best score across a result's content and title
    pub fn score(&self, query: &PreparedQuery, result: &SearchResult) -> f32 {
        self.score_text(query, &result.content)
            .max(self.score_text(query, &result.metadata.title))
    }

    /// Score a single candidate; an accepted one is copied with its score and highlights
    pub fn refine(&self, query: &PreparedQuery, candidate: &SearchResult) -> Option<SearchResult> {
        let score = self.score(query, candidate);
        if score < self.config.acceptance_threshold {
            return None;
        }

        let mut result = candidate.clone();
        result.fuzzy_score = Some(score);
        result.highlights = [("content", &result.content), ("title", &result.metadata.title)]
            .into_iter()
            .filter_map(|(field, text)| {
                let matches = highlight_matches(text, &query.raw);
                (!matches.is_empty()).then(|| Highlight {
                    field: field.to_string(),
                    matches,
                })
            })
            .collect();

        Some(result)
    }

    /// Sort accepted results by fuzzy score, descending
    ///
    /// The sort is stable, so ties keep their input order.
    pub fn rank(mut results: Vec<SearchResult>) -> Vec<SearchResult> {
        results.sort_by(|a, b| {
            let a = a.fuzzy_score.unwrap_or(0.0);
            let b = b.fuzzy_score.unwrap_or(0.0);
            b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
        });
        results
    }

    /// Refine a candidate set against `params.query`
    ///
    /// An empty query returns `results` untouched, in order.
    pub fn search(&self, results: Vec<SearchResult>, params: &SearchParams) -> Vec<SearchResult> {
        let Some(query) = PreparedQuery::new(&params.query) else {
            return results;
        };

        Self::rank(self.refine_all(&query, &results))
    }

    /// Accepted candidates, unranked, in input order
    pub fn refine_all(&self, query: &PreparedQuery, results: &[SearchResult]) -> Vec<SearchResult> {
        results
            .iter()
            .filter_map(|r| self.refine(query, r))
            .collect()
    }

    /// Suggest past queries for a partial input
    ///
    /// Prefix matches rank first, then substring matches, then fuzzy ones;
    /// within a tier, frequently used and then recently used queries win.
    pub fn suggest_queries(&self, partial: &str, history: &[SearchHistoryEntry]) -> Vec<String> {
        let Some(query) = PreparedQuery::new(partial) else {
            return Vec::new();
        };

        let mut candidates: Vec<(u8, &SearchHistoryEntry)> = history
            .iter()
            .filter_map(|entry| {
                let lower = entry.query.to_lowercase();
                let tier = if lower.starts_with(query.as_str()) {
                    0
                } else if lower.contains(query.as_str()) {
                    1
                } else if self.score_text(&query, &entry.query) >= self.config.acceptance_threshold
                {
                    2
                } else {
                    return None;
                };
                Some((tier, entry))
            })
            .collect();

        candidates.sort_by(|(tier_a, a), (tier_b, b)| {
            tier_a
                .cmp(tier_b)
                .then_with(|| b.count.cmp(&a.count))
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        });

        let mut seen = std::collections::HashSet::new();
        candidates
            .into_iter()
            .filter(|(_, entry)| seen.insert(entry.query.to_lowercase()))
            .map(|(_, entry)| entry.query.clone())
            .take(self.config.max_suggestions)
            .collect()
    }
}
