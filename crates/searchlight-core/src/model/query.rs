//! Query-side types: params, filters, stats, history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SearchResult;

// ============================================================================
// FILTERS
// ============================================================================

/// Comparison applied by a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Equals,
    Contains,
    Between,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::Contains => "contains",
            FilterOperator::Between => "between",
            FilterOperator::Gt => "gt",
            FilterOperator::Lt => "lt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lte => "lte",
        }
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FilterOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "equals" | "eq" => Ok(FilterOperator::Equals),
            "contains" => Ok(FilterOperator::Contains),
            "between" => Ok(FilterOperator::Between),
            "gt" => Ok(FilterOperator::Gt),
            "lt" => Ok(FilterOperator::Lt),
            "gte" => Ok(FilterOperator::Gte),
            "lte" => Ok(FilterOperator::Lte),
            _ => Err(format!("Unknown filter operator: {}", s)),
        }
    }
}

/// A single comparable value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Filter operand
///
/// `between` takes a `{start, end}` range; every other operator takes a scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Range { start: Scalar, end: Scalar },
    Number(f64),
    Text(String),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Number(value)
    }
}

/// A predicate over one result field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Inclusive date range filter
    pub fn date_between(field: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::Between,
            value: FilterValue::Range {
                start: Scalar::Text(start.into()),
                end: Scalar::Text(end.into()),
            },
        }
    }
}

// ============================================================================
// PARAMS
// ============================================================================

/// Input to a search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Query text; empty means unfiltered
    #[serde(default)]
    pub query: String,
    /// Filters combined with AND
    #[serde(default)]
    pub filters: Vec<Filter>,
    /// Reserved; does not alter matching
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub semantic: bool,
    /// Maximum number of results to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl SearchParams {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Copy with the query trimmed and lowercased
    pub fn normalized(&self) -> Self {
        Self {
            query: self.query.trim().to_lowercase(),
            ..self.clone()
        }
    }

    /// Key under which results for these params are cached
    pub fn cache_key(&self) -> String {
        let normalized = self.normalized();
        serde_json::to_string(&normalized).unwrap_or_else(|_| format!("{:?}", normalized))
    }
}

// ============================================================================
// RESPONSE
// ============================================================================

/// Where a result set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultOrigin {
    /// Fresh delegate fetch
    Live,
    /// TTL cache hit
    Cache,
    /// Offline index fallback
    Offline,
    /// Last-known-good copy of an earlier live result
    Stale,
}

impl std::fmt::Display for ResultOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultOrigin::Live => write!(f, "live"),
            ResultOrigin::Cache => write!(f, "cache"),
            ResultOrigin::Offline => write!(f, "offline"),
            ResultOrigin::Stale => write!(f, "stale"),
        }
    }
}

/// Statistics reported alongside every response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    pub total_results: usize,
    pub filter_count: usize,
    pub search_time_ms: f64,
    pub cached: bool,
    pub origin: ResultOrigin,
}

/// Results plus stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub stats: SearchStats,
}

/// Outcome of an offline index rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSummary {
    /// Records in the durable snapshot after the call
    pub indexed: usize,
    /// True when the rebuild failed and the previous snapshot was kept
    pub preserved_previous: bool,
}

// ============================================================================
// HISTORY
// ============================================================================

/// One remembered query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub count: u32,
}

impl SearchHistoryEntry {
    pub fn new(query: impl Into<String>, count: u32) -> Self {
        Self {
            query: query.into(),
            timestamp: Utc::now(),
            count,
        }
    }
}
