//! Remote result sources

use async_trait::async_trait;

use crate::model::{SearchParams, SearchResult};
use crate::recovery::Result;

/// The live delegate behind a search
///
/// Returns raw candidates; refinement, filtering and caching happen in the
/// coordinator. Failures should carry `NETWORK_ERROR` or `TIMEOUT_ERROR` when
/// they are worth retrying and falling back from.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch(&self, params: &SearchParams) -> Result<Vec<SearchResult>>;

    /// Everything the source can return, used to rebuild the offline index
    async fn fetch_universe(&self) -> Result<Vec<SearchResult>> {
        self.fetch(&SearchParams::default()).await
    }
}

/// A fixed, in-memory result set
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    results: Vec<SearchResult>,
}

impl StaticSource {
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self { results }
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }
}

#[async_trait]
impl RemoteSource for StaticSource {
    async fn fetch(&self, _params: &SearchParams) -> Result<Vec<SearchResult>> {
        Ok(self.results.clone())
    }
}
