//! Result sources available from the command line

use std::path::PathBuf;

use async_trait::async_trait;
use searchlight_core::{RemoteSource, SearchError, SearchParams, SearchResult};

type Result<T> = std::result::Result<T, SearchError>;

/// A JSON array of results on disk, read on every fetch
///
/// An unreadable file is a network error (so searches fall back to the
/// offline index); malformed JSON is not.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RemoteSource for FileSource {
    async fn fetch(&self, _params: &SearchParams) -> Result<Vec<SearchResult>> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SearchError::network(format!("Could not read {}", self.path.display()))
                .with_details(e.to_string())
        })?;

        serde_json::from_str(&raw).map_err(|e| {
            SearchError::search(format!("{} is not a JSON array of results", self.path.display()))
                .with_details(e.to_string())
        })
    }
}

/// No live source; every search is served from the offline index
pub struct OfflineOnly;

#[async_trait]
impl RemoteSource for OfflineOnly {
    async fn fetch(&self, _params: &SearchParams) -> Result<Vec<SearchResult>> {
        Err(SearchError::network("No live source configured"))
    }
}
