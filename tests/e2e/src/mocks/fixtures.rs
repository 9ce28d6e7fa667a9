//! Test Data Factory
//!
//! Provides realistic result sets:
//! - Single results with full metadata
//! - Batch generation for stress testing
//! - A small mixed corpus that journey tests search over

use searchlight_core::SearchResult;

/// Factory for creating test results
///
/// # Example
///
/// ```rust,ignore
/// let one = TestDataFactory::create_result("7", "Quarterly budget review", "Budget");
/// let many = TestDataFactory::create_batch(500);
/// let corpus = TestDataFactory::corpus();
/// ```
pub struct TestDataFactory;

impl TestDataFactory {
    /// Create a result with only content and title
    pub fn create_result(id: &str, content: &str, title: &str) -> SearchResult {
        SearchResult::new(id, content, title)
    }

    /// Create a result with category, date, author and tags
    pub fn create_result_full(
        id: &str,
        content: &str,
        title: &str,
        category: &str,
        date: &str,
        author: &str,
        tags: &[&str],
    ) -> SearchResult {
        let mut result = SearchResult::new(id, content, title);
        result.metadata.category = Some(category.to_string());
        result.metadata.date = Some(date.to_string());
        result.metadata.author = Some(author.to_string());
        result.metadata.tags = tags.iter().map(|t| t.to_string()).collect();
        result
    }

    /// Create `count` generic results with cycling categories and dates
    pub fn create_batch(count: usize) -> Vec<SearchResult> {
        let categories = ["work", "home", "travel"];
        (0..count)
            .map(|i| {
                let mut result = SearchResult::new(
                    format!("batch-{}", i),
                    format!("Generated note number {}", i),
                    format!("Note {}", i),
                );
                result.metadata.category = Some(categories[i % categories.len()].to_string());
                result.metadata.date = Some(format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1));
                result.score = 1.0 - (i % 10) as f32 / 10.0;
                result
            })
            .collect()
    }

    /// Eight documents across three categories and the first half of 2024
    pub fn corpus() -> Vec<SearchResult> {
        vec![
            Self::create_result_full(
                "budget-q1",
                "Quarterly budget review for the platform team",
                "Q1 Budget",
                "work",
                "2024-01-15",
                "Dana",
                &["finance", "planning"],
            ),
            Self::create_result_full(
                "budget-q2",
                "Budget forecast and hiring plan",
                "Q2 Budget",
                "work",
                "2024-04-10",
                "Dana",
                &["finance"],
            ),
            Self::create_result_full(
                "offsite",
                "Agenda for the team offsite in Lisbon",
                "Offsite Agenda",
                "travel",
                "2024-03-02",
                "Sam",
                &["travel", "planning"],
            ),
            Self::create_result_full(
                "flights",
                "Flight confirmation and hotel booking",
                "Lisbon Trip",
                "travel",
                "2024-02-28",
                "Sam",
                &["travel"],
            ),
            Self::create_result_full(
                "groceries",
                "Weekly groceries and meal plan",
                "Groceries",
                "home",
                "2024-05-05",
                "Alex",
                &["errands"],
            ),
            Self::create_result_full(
                "garden",
                "Spring garden planting schedule",
                "Garden",
                "home",
                "2024-03-20",
                "Alex",
                &["outdoors", "planning"],
            ),
            Self::create_result_full(
                "retro",
                "Sprint retrospective notes and action items",
                "Retro",
                "work",
                "2024-06-01",
                "Robin",
                &["meetings"],
            ),
            Self::create_result_full(
                "roadmap",
                "Product roadmap for the second half",
                "Roadmap",
                "work",
                "2024-06-20",
                "Robin",
                &["planning"],
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_corpus_ids_are_unique() {
        let corpus = TestDataFactory::corpus();
        let ids: HashSet<_> = corpus.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), corpus.len());
    }

    #[test]
    fn test_batch_has_metadata() {
        let batch = TestDataFactory::create_batch(30);
        assert_eq!(batch.len(), 30);
        assert!(batch.iter().all(|r| r.metadata.category.is_some()));
        assert!(batch.iter().all(|r| r.metadata.date.is_some()));
    }
}
