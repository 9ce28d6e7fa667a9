//! Compiled filters
//!
//! Filters are resolved once into a field accessor plus a pre-parsed operand,
//! so evaluating them over many results does no string dispatch or date
//! parsing of the filter side. Compilation doubles as validation: any
//! unsupported field/operator/value combination is a `VALIDATION_ERROR`.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::model::{Filter, FilterOperator, FilterValue, Scalar, SearchResult};
use crate::recovery::{Result, SearchError};

/// Tolerance for numeric equality (scores are stored as f32)
const NUMBER_EPSILON: f64 = 1e-6;

// ============================================================================
// FIELDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Number,
    Date,
    List,
}

/// A resolved result field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRef {
    Id,
    Content,
    Title,
    Description,
    Author,
    Category,
    Score,
    FuzzyScore,
    Date,
    Tags,
}

impl FieldRef {
    /// Resolve a field name; `metadata.` prefixes are accepted
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        let name = name.strip_prefix("metadata.").unwrap_or(name);
        match name {
            "id" => Some(FieldRef::Id),
            "content" => Some(FieldRef::Content),
            "title" => Some(FieldRef::Title),
            "description" => Some(FieldRef::Description),
            "author" => Some(FieldRef::Author),
            "category" => Some(FieldRef::Category),
            "score" => Some(FieldRef::Score),
            "fuzzyScore" | "fuzzy_score" => Some(FieldRef::FuzzyScore),
            "date" => Some(FieldRef::Date),
            "tags" => Some(FieldRef::Tags),
            _ => None,
        }
    }

    /// Score fields compare numerically
    pub fn is_numeric(&self) -> bool {
        self.kind() == FieldKind::Number
    }

    fn kind(&self) -> FieldKind {
        match self {
            FieldRef::Id
            | FieldRef::Content
            | FieldRef::Title
            | FieldRef::Description
            | FieldRef::Author
            | FieldRef::Category => FieldKind::Text,
            FieldRef::Score | FieldRef::FuzzyScore => FieldKind::Number,
            FieldRef::Date => FieldKind::Date,
            FieldRef::Tags => FieldKind::List,
        }
    }

    fn text<'a>(&self, result: &'a SearchResult) -> Option<&'a str> {
        match self {
            FieldRef::Id => Some(result.id.as_str()),
            FieldRef::Content => Some(result.content.as_str()),
            FieldRef::Title => Some(result.metadata.title.as_str()),
            FieldRef::Description => result.metadata.description.as_deref(),
            FieldRef::Author => result.metadata.author.as_deref(),
            FieldRef::Category => result.metadata.category.as_deref(),
            _ => None,
        }
    }

    fn number(&self, result: &SearchResult) -> Option<f64> {
        match self {
            FieldRef::Score => Some(f64::from(result.score)),
            FieldRef::FuzzyScore => result.fuzzy_score.map(f64::from),
            _ => None,
        }
    }

    fn date(&self, result: &SearchResult) -> Option<DateTime<Utc>> {
        match self {
            FieldRef::Date => result.metadata.date.as_deref().and_then(parse_date),
            _ => None,
        }
    }

    fn list<'a>(&self, result: &'a SearchResult) -> &'a [String] {
        match self {
            FieldRef::Tags => &result.metadata.tags,
            _ => &[],
        }
    }
}

// ============================================================================
// DATES
// ============================================================================

fn parse_bare_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Parse RFC 3339, naive date-time, or bare `YYYY-MM-DD` (midnight UTC)
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    parse_bare_date(value)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Upper bound of an inclusive range; a bare date covers the whole day
fn parse_end_date(value: &str) -> Option<DateTime<Utc>> {
    match parse_bare_date(value) {
        Some(day) => day.and_hms_milli_opt(23, 59, 59, 999).map(|naive| naive.and_utc()),
        None => parse_date(value),
    }
}

// ============================================================================
// PREDICATES
// ============================================================================

/// Numbers within `NUMBER_EPSILON` compare equal
fn compare_numbers(a: f64, b: f64) -> Option<Ordering> {
    if (a - b).abs() < NUMBER_EPSILON {
        return Some(Ordering::Equal);
    }
    a.partial_cmp(&b)
}

/// Ordering comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    fn from_operator(op: FilterOperator) -> Option<Self> {
        match op {
            FilterOperator::Equals => Some(CompareOp::Eq),
            FilterOperator::Gt => Some(CompareOp::Gt),
            FilterOperator::Gte => Some(CompareOp::Gte),
            FilterOperator::Lt => Some(CompareOp::Lt),
            FilterOperator::Lte => Some(CompareOp::Lte),
            FilterOperator::Contains | FilterOperator::Between => None,
        }
    }

    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Gte => ordering != Ordering::Less,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Lte => ordering != Ordering::Greater,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    TextEquals(String),
    /// Lowercased needle
    TextContains(String),
    TextCompare(CompareOp, String),
    NumberCompare(CompareOp, f64),
    NumberBetween(f64, f64),
    DateCompare(CompareOp, DateTime<Utc>),
    DateBetween(DateTime<Utc>, DateTime<Utc>),
    ListEquals(String),
    /// Lowercased needle
    ListContains(String),
}

/// A filter resolved for repeated evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilter {
    field: FieldRef,
    predicate: Predicate,
}

impl CompiledFilter {
    pub fn field(&self) -> FieldRef {
        self.field
    }

    /// Does `result` satisfy this filter? Missing or unparseable fields never match.
    pub fn matches(&self, result: &SearchResult) -> bool {
        let field = self.field;
        match &self.predicate {
            Predicate::TextEquals(value) => field.text(result).is_some_and(|t| t == value),
            Predicate::TextContains(needle) => field
                .text(result)
                .is_some_and(|t| t.to_lowercase().contains(needle.as_str())),
            Predicate::TextCompare(op, value) => field
                .text(result)
                .is_some_and(|t| op.holds(t.cmp(value.as_str()))),
            Predicate::NumberCompare(op, value) => field
                .number(result)
                .and_then(|n| compare_numbers(n, *value))
                .is_some_and(|ordering| op.holds(ordering)),
            Predicate::NumberBetween(start, end) => field.number(result).is_some_and(|n| {
                compare_numbers(n, *start).is_some_and(|o| o != Ordering::Less)
                    && compare_numbers(n, *end).is_some_and(|o| o != Ordering::Greater)
            }),
            Predicate::DateCompare(op, value) => field
                .date(result)
                .is_some_and(|d| op.holds(d.cmp(value))),
            Predicate::DateBetween(start, end) => field
                .date(result)
                .is_some_and(|d| d >= *start && d <= *end),
            Predicate::ListEquals(value) => field.list(result).iter().any(|t| t == value),
            Predicate::ListContains(needle) => field
                .list(result)
                .iter()
                .any(|t| t.to_lowercase().contains(needle.as_str())),
        }
    }
}

// ============================================================================
// COMPILATION
// ============================================================================

fn unsupported(filter: &Filter) -> SearchError {
    SearchError::validation(format!(
        "Operator '{}' is not supported for field '{}' with this value",
        filter.operator, filter.field
    ))
    .with_details(serde_json::to_string(&filter.value).unwrap_or_default())
}

fn invalid_date(filter: &Filter, value: &str) -> SearchError {
    SearchError::validation(format!(
        "Invalid date '{}' in filter on '{}'",
        value, filter.field
    ))
}

/// Resolve one filter, or fail with a validation error
pub fn compile_filter(filter: &Filter) -> Result<CompiledFilter> {
    if filter.field.trim().is_empty() {
        return Err(SearchError::validation("Filter field must be a non-empty string"));
    }

    let field = FieldRef::parse(&filter.field).ok_or_else(|| {
        SearchError::validation(format!("Unknown filter field '{}'", filter.field))
    })?;
    let compare = CompareOp::from_operator(filter.operator);

    let predicate = match (field.kind(), filter.operator, &filter.value) {
        (FieldKind::Text, FilterOperator::Equals, FilterValue::Text(v)) => {
            Predicate::TextEquals(v.clone())
        }
        (FieldKind::Text, FilterOperator::Contains, FilterValue::Text(v)) => {
            Predicate::TextContains(v.to_lowercase())
        }
        (
            FieldKind::Text,
            FilterOperator::Gt | FilterOperator::Gte | FilterOperator::Lt | FilterOperator::Lte,
            FilterValue::Text(v),
        ) => Predicate::TextCompare(compare.ok_or_else(|| unsupported(filter))?, v.clone()),

        (
            FieldKind::Number,
            FilterOperator::Equals
            | FilterOperator::Gt
            | FilterOperator::Gte
            | FilterOperator::Lt
            | FilterOperator::Lte,
            FilterValue::Number(n),
        ) => Predicate::NumberCompare(compare.ok_or_else(|| unsupported(filter))?, *n),
        (
            FieldKind::Number,
            FilterOperator::Between,
            FilterValue::Range {
                start: Scalar::Number(start),
                end: Scalar::Number(end),
            },
        ) => Predicate::NumberBetween(*start, *end),

        (FieldKind::Date, FilterOperator::Equals, FilterValue::Text(v)) => {
            // A bare date matches anything on that day
            match (parse_bare_date(v), parse_end_date(v)) {
                (Some(day), Some(end)) => {
                    let start = day
                        .and_hms_opt(0, 0, 0)
                        .map(|naive| naive.and_utc())
                        .ok_or_else(|| invalid_date(filter, v))?;
                    Predicate::DateBetween(start, end)
                }
                _ => Predicate::DateCompare(
                    CompareOp::Eq,
                    parse_date(v).ok_or_else(|| invalid_date(filter, v))?,
                ),
            }
        }
        (
            FieldKind::Date,
            FilterOperator::Gt | FilterOperator::Gte | FilterOperator::Lt | FilterOperator::Lte,
            FilterValue::Text(v),
        ) => Predicate::DateCompare(
            compare.ok_or_else(|| unsupported(filter))?,
            parse_date(v).ok_or_else(|| invalid_date(filter, v))?,
        ),
        (
            FieldKind::Date,
            FilterOperator::Between,
            FilterValue::Range {
                start: Scalar::Text(start),
                end: Scalar::Text(end),
            },
        ) => {
            let from = parse_date(start).ok_or_else(|| invalid_date(filter, start))?;
            let to = parse_end_date(end).ok_or_else(|| invalid_date(filter, end))?;
            if from > to {
                return Err(SearchError::validation(format!(
                    "Date range on '{}' starts after it ends",
                    filter.field
                )));
            }
            Predicate::DateBetween(from, to)
        }

        (FieldKind::List, FilterOperator::Equals, FilterValue::Text(v)) => {
            Predicate::ListEquals(v.clone())
        }
        (FieldKind::List, FilterOperator::Contains, FilterValue::Text(v)) => {
            Predicate::ListContains(v.to_lowercase())
        }

        _ => return Err(unsupported(filter)),
    };

    Ok(CompiledFilter { field, predicate })
}

/// Resolve every filter, failing on the first invalid one
pub fn compile_filters(filters: &[Filter]) -> Result<Vec<CompiledFilter>> {
    filters.iter().map(compile_filter).collect()
}

/// Keep results that satisfy every compiled filter (AND semantics)
pub fn apply_filters(results: Vec<SearchResult>, filters: &[CompiledFilter]) -> Vec<SearchResult> {
    if filters.is_empty() {
        return results;
    }
    results
        .into_iter()
        .filter(|r| filters.iter().all(|f| f.matches(r)))
        .collect()
}

/// Compile and apply `filters`; no filters is a pass-through
pub fn optimize_filters(results: Vec<SearchResult>, filters: &[Filter]) -> Result<Vec<SearchResult>> {
    if filters.is_empty() {
        return Ok(results);
    }
    let compiled = compile_filters(filters)?;
    Ok(apply_filters(results, &compiled))
}
