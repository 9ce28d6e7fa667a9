//! Search Result - The unit every component passes around
//!
//! A result carries the delegate's relevance score, an optional fuzzy
//! score assigned during refinement, free-text content, metadata, and the
//! literal highlight spans a renderer can draw.

use serde::{Deserialize, Serialize};

// ============================================================================
// METADATA
// ============================================================================

/// Descriptive metadata attached to a result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Short description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Date string (RFC 3339, `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Author name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Category label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
}

// ============================================================================
// HIGHLIGHTS
// ============================================================================

/// A literal occurrence of the query inside a text field
///
/// `start` and `end` are character offsets into the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// All matches found in one field of a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    /// Field name (`content` or `title`)
    pub field: String,
    pub matches: Vec<MatchSpan>,
}

// ============================================================================
// SEARCH RESULT
// ============================================================================

/// A single search result
///
/// `id` is unique within a result set. `score` and `fuzzy_score` are in [0, 1].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Unique identifier
    pub id: String,
    /// Relevance reported by the delegate
    #[serde(default)]
    pub score: f32,
    /// Similarity assigned by the fuzzy matcher (absent until scored)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzzy_score: Option<f32>,
    /// Free text body
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub metadata: ResultMetadata,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
}

impl SearchResult {
    /// Create a result with an id, content and title
    pub fn new(id: impl Into<String>, content: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            score: 1.0,
            content: content.into(),
            metadata: ResultMetadata {
                title: title.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Lowercased concatenation of content and title, as stored in the offline index
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.content, self.metadata.title).to_lowercase()
    }
}
