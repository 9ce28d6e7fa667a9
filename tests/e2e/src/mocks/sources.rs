//! Controllable remote sources

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use searchlight_core::{RemoteSource, SearchError, SearchParams, SearchResult};

/// How the next fetches behave
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceBehavior {
    /// Return every configured result
    Online,
    /// Fail with a network error
    Offline,
    /// Fail with a non-recoverable search error
    Broken,
    /// Sleep before answering
    Slow(Duration),
}

/// A remote source whose behavior can be switched mid-test
///
/// Counts every fetch so tests can assert on cache hits and retries.
#[derive(Debug)]
pub struct TestSource {
    results: Mutex<Vec<SearchResult>>,
    behavior: Mutex<SourceBehavior>,
    calls: AtomicUsize,
}

impl TestSource {
    pub fn online(results: Vec<SearchResult>) -> Self {
        Self {
            results: Mutex::new(results),
            behavior: Mutex::new(SourceBehavior::Online),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn offline() -> Self {
        let source = Self::online(Vec::new());
        source.set_behavior(SourceBehavior::Offline);
        source
    }

    pub fn set_behavior(&self, behavior: SourceBehavior) {
        *self.behavior.lock().unwrap_or_else(|e| e.into_inner()) = behavior;
    }

    pub fn set_results(&self, results: Vec<SearchResult>) {
        *self.results.lock().unwrap_or_else(|e| e.into_inner()) = results;
    }

    /// Fetches issued so far, including retries
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn behavior(&self) -> SourceBehavior {
        *self.behavior.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn snapshot(&self) -> Vec<SearchResult> {
        self.results.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl RemoteSource for TestSource {
    async fn fetch(&self, _params: &SearchParams) -> Result<Vec<SearchResult>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.behavior() {
            SourceBehavior::Online => Ok(self.snapshot()),
            SourceBehavior::Offline => Err(SearchError::network("connection refused")),
            SourceBehavior::Broken => Err(SearchError::search("upstream rejected the query")),
            SourceBehavior::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(self.snapshot())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use searchlight_core::ErrorKind;

    #[tokio::test]
    async fn test_behavior_switches_and_counts() {
        let source = TestSource::online(vec![SearchResult::new("1", "a", "A")]);
        assert_eq!(source.fetch(&SearchParams::default()).await.unwrap().len(), 1);

        source.set_behavior(SourceBehavior::Offline);
        let err = source.fetch(&SearchParams::default()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Network);
        assert_eq!(source.calls(), 2);
    }
}
