//! Fuzzy Module
//!
//! Pure functions over in-memory result sets. No I/O, no shared state:
//! - Similarity scoring (substring band + edit-distance band)
//! - Ranking with stable ties
//! - Query suggestions from history
//! - Literal highlight spans

mod distance;
mod highlight;
mod matcher;

pub use distance::{edit_distance, similarity, similarity_at_least};
pub use highlight::highlight_matches;
pub use matcher::{FuzzyMatcher, PreparedQuery};
