//! Journey: malformed input is rejected before any work happens
//!
//! 1. Untyped params (e.g. JSON from a caller) are checked and converted
//! 2. Invalid filters fail fast with a validation error
//! 3. The live source is never contacted for an invalid request

use std::sync::Arc;

use searchlight_core::{
    ErrorKind, Filter, FilterOperator, SearchParams, validate_search_params_value,
};
use searchlight_e2e_tests::{TestDataFactory, TestIndexManager, TestSource};
use serde_json::json;

#[test]
fn test_well_formed_json_params_convert() {
    let params = validate_search_params_value(&json!({
        "query": "budget",
        "filters": [
            { "field": "category", "operator": "equals", "value": "work" },
            { "field": "date", "operator": "between",
              "value": { "start": "2024-01-01", "end": "2024-06-30" } }
        ],
        "limit": 5
    }))
    .unwrap();

    assert_eq!(params.query, "budget");
    assert_eq!(params.filters.len(), 2);
    assert_eq!(params.filters[1], Filter::date_between("date", "2024-01-01", "2024-06-30"));
    assert_eq!(params.limit, Some(5));
}

#[test]
fn test_malformed_json_params_are_rejected() {
    let cases = [
        json!(null),
        json!("budget"),
        json!({ "filters": [] }),
        json!({ "query": 42, "filters": [] }),
        json!({ "query": "budget" }),
        json!({ "query": "budget", "filters": {} }),
        json!({ "query": "budget", "filters": [{ "field": " ", "operator": "equals", "value": "x" }] }),
        json!({ "query": "budget", "filters": [{ "field": "category", "operator": "like", "value": "x" }] }),
        json!({ "query": "budget", "filters": [{ "field": "colour", "operator": "equals", "value": "x" }] }),
    ];

    for case in cases {
        let err = validate_search_params_value(&case).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation, "accepted {}", case);
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_invalid_filters_never_reach_the_source() {
    let env = TestIndexManager::new_temp();
    let source = Arc::new(TestSource::online(TestDataFactory::corpus()));
    let coordinator = env.coordinator(source.clone());

    let invalid = [
        SearchParams::query("budget").with_filter(Filter::new("", FilterOperator::Equals, "x")),
        SearchParams::query("budget").with_filter(Filter::new("score", FilterOperator::Gt, "high")),
        SearchParams::query("budget").with_filter(Filter::date_between(
            "date",
            "2024-06-30",
            "2024-01-01",
        )),
        SearchParams::query("budget").with_filter(Filter::new(
            "category",
            FilterOperator::Between,
            "work",
        )),
    ];

    for params in &invalid {
        let err = coordinator.search(params).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
    assert_eq!(source.calls(), 0);
    assert_eq!(coordinator.cached_entries(), 0);
}
