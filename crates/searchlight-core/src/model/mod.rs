//! Model module - Core types shared by every component
//!
//! - Search results with metadata and highlight spans
//! - Search params and typed filters
//! - Response stats and history entries

mod query;
mod result;

pub use query::{
    Filter, FilterOperator, FilterValue, IndexSummary, ResultOrigin, Scalar, SearchHistoryEntry,
    SearchParams, SearchResponse, SearchStats,
};
pub use result::{Highlight, MatchSpan, ResultMetadata, SearchResult};
