//! Error Recovery Module
//!
//! Validation, retry with exponential backoff, and the mapping from error
//! class to fallback behavior:
//! - `NETWORK_ERROR` / `TIMEOUT_ERROR`: serve fallback (offline) results
//! - `SYNC_ERROR`: keep last-known-good data
//! - everything else: rethrow after logging
//!
//! `log_error` is the only place this crate logs an error.

mod error;

pub use error::{ErrorKind, Result, SearchError};

use std::future::Future;

use serde_json::Value;

use crate::config::RetryConfig;
use crate::model::{SearchParams, SearchResult};
use crate::optimize::{CompiledFilter, compile_filters};

// ============================================================================
// LOGGING
// ============================================================================

/// Write a structured `{code, message, details}` record to the error log
pub fn log_error(err: &SearchError) {
    tracing::error!(
        code = err.code(),
        message = %err.message,
        details = err.details.as_deref().unwrap_or(""),
        "search subsystem error"
    );
}

// ============================================================================
// RETRY
// ============================================================================

/// Run `operation`, retrying every failure with exponential backoff
///
/// Gives up after `config.max_attempts` invocations and returns the last error.
pub async fn retry<T, E, F, Fut>(operation: F, config: &RetryConfig) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    retry_when(operation, config, |_| true).await
}

/// Like [`retry`], but stops early when `should_retry` rejects the error
pub async fn retry_when<T, E, F, Fut, P>(
    mut operation: F,
    config: &RetryConfig,
    should_retry: P,
) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let max_attempts = config.max_attempts.max(1);
    let mut delay = config.delay;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= max_attempts || !should_retry(&err) {
                    return Err(err);
                }

                tracing::debug!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Attempt failed, retrying: {}",
                    err
                );

                tokio::time::sleep(delay).await;
                delay = delay.mul_f64(config.backoff_factor.max(1.0));
                attempt += 1;
            }
        }
    }
}

// ============================================================================
// FALLBACKS
// ============================================================================

/// Substitute `fallback` for recoverable delegate failures
///
/// Network and timeout errors yield `fallback`; every other error is returned
/// unchanged. The error is logged either way.
pub fn recover_from_search_error(
    err: SearchError,
    fallback: Vec<SearchResult>,
    params: &SearchParams,
) -> Result<Vec<SearchResult>> {
    log_error(&err);

    match err.kind {
        ErrorKind::Network | ErrorKind::Timeout => {
            tracing::warn!(
                query = %params.query,
                fallback_results = fallback.len(),
                "Serving fallback results after {}",
                err.code()
            );
            Ok(fallback)
        }
        ErrorKind::Validation | ErrorKind::Sync | ErrorKind::Search => Err(err),
    }
}

/// Keep last-known-good data when a snapshot write fails
pub fn handle_sync_error(err: SearchError, fallback: Vec<SearchResult>) -> Result<Vec<SearchResult>> {
    log_error(&err);

    match err.kind {
        ErrorKind::Sync => {
            tracing::warn!(
                preserved_results = fallback.len(),
                "Sync failed, keeping last-known-good data"
            );
            Ok(fallback)
        }
        ErrorKind::Validation | ErrorKind::Network | ErrorKind::Timeout | ErrorKind::Search => {
            Err(err)
        }
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Validate typed params before any I/O
///
/// Every filter needs a non-empty field and a supported operator/value pair.
/// Returns the filters compiled, ready to apply.
pub fn validate_search_params(params: &SearchParams) -> Result<Vec<CompiledFilter>> {
    if params.filters.iter().any(|f| f.field.trim().is_empty()) {
        return Err(SearchError::validation("Filter field must be a non-empty string"));
    }

    compile_filters(&params.filters)
}

/// Validate untyped params (e.g. JSON from a caller) and convert them
pub fn validate_search_params_value(value: &Value) -> Result<SearchParams> {
    let object = match value {
        Value::Object(map) => map,
        Value::Null => return Err(SearchError::validation("Search params are required")),
        other => {
            return Err(SearchError::validation("Search params must be an object")
                .with_details(other.to_string()));
        }
    };

    match object.get("query") {
        Some(Value::String(_)) => {}
        other => {
            return Err(SearchError::validation("Search query must be a string")
                .with_details(other.map(Value::to_string).unwrap_or_else(|| "missing".into())));
        }
    }

    let filters = match object.get("filters") {
        Some(Value::Array(filters)) => filters,
        other => {
            return Err(SearchError::validation("Filters must be an array")
                .with_details(other.map(Value::to_string).unwrap_or_else(|| "missing".into())));
        }
    };

    for filter in filters {
        let field = filter.get("field").and_then(Value::as_str).unwrap_or("");
        if field.trim().is_empty() {
            return Err(SearchError::validation("Filter field must be a non-empty string")
                .with_details(filter.to_string()));
        }
    }

    let params: SearchParams = serde_json::from_value(value.clone()).map_err(|e| {
        SearchError::validation("Search params are malformed").with_details(e.to_string())
    })?;

    validate_search_params(&params)?;
    Ok(params)
}
