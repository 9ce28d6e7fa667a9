//! Literal highlight spans
//!
//! Highlighting only ever marks literal (case-insensitive) occurrences of the
//! query. Fuzzy matches are never highlighted.

use crate::model::MatchSpan;

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Every non-overlapping, case-insensitive occurrence of `query` in `text`
///
/// Offsets are character positions; `text` in each span is the original slice.
pub fn highlight_matches(text: &str, query: &str) -> Vec<MatchSpan> {
    let needle: Vec<char> = query.chars().map(fold).collect();
    if needle.is_empty() {
        return Vec::new();
    }

    let original: Vec<char> = text.chars().collect();
    let folded: Vec<char> = original.iter().copied().map(fold).collect();

    let mut spans = Vec::new();
    let mut i = 0;
    while i + needle.len() <= folded.len() {
        if folded[i..i + needle.len()] == needle[..] {
            spans.push(MatchSpan {
                start: i,
                end: i + needle.len(),
                text: original[i..i + needle.len()].iter().collect(),
            });
            i += needle.len();
        } else {
            i += 1;
        }
    }

    spans
}
