//! Offline Index
//!
//! Durable snapshot of the result universe, used when live search fails.
//! The snapshot is only ever replaced wholesale, inside one transaction, so
//! a reader sees either the previous snapshot or the new one.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use super::{IndexError, Result, open_connection};
use crate::config::{IndexLocation, OptimizerConfig};
use crate::fuzzy::FuzzyMatcher;
use crate::model::{SearchParams, SearchResult};
use crate::optimize::process_in_batches;

/// A stored search result plus its derived lookup text
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedRecord {
    pub result: SearchResult,
    /// Lowercased "content title"
    pub searchable_text: String,
    pub last_updated: DateTime<Utc>,
}

impl IndexedRecord {
    pub fn new(result: SearchResult, last_updated: DateTime<Utc>) -> Self {
        Self {
            searchable_text: result.searchable_text(),
            result,
            last_updated,
        }
    }
}

/// Lazily opened SQLite-backed offline index
///
/// Cheap to clone; clones share the connection. The connection is opened on
/// first use, and an open failure is retried on the next call.
#[derive(Clone)]
pub struct OfflineIndex {
    location: IndexLocation,
    conn: Arc<Mutex<Option<Connection>>>,
    matcher: FuzzyMatcher,
    batch_size: usize,
}

impl std::fmt::Debug for OfflineIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineIndex")
            .field("location", &self.location)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl OfflineIndex {
    pub fn new(location: IndexLocation) -> Self {
        Self::with_matcher(location, FuzzyMatcher::new())
    }

    pub fn in_memory() -> Self {
        Self::new(IndexLocation::InMemory)
    }

    pub fn with_matcher(location: IndexLocation, matcher: FuzzyMatcher) -> Self {
        Self {
            location,
            conn: Arc::new(Mutex::new(None)),
            matcher,
            batch_size: OptimizerConfig::default().batch_size,
        }
    }

    /// Rows inserted per logged batch during a rebuild
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn location(&self) -> &IndexLocation {
        &self.location
    }

    pub fn matcher(&self) -> &FuzzyMatcher {
        &self.matcher
    }

    /// Replace the matcher used by [`OfflineIndex::search`]
    pub fn set_matcher(&mut self, matcher: FuzzyMatcher) {
        self.matcher = matcher;
    }

    /// Run `op` against the open connection on the blocking pool
    async fn with_connection<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let slot = Arc::clone(&self.conn);
        let location = self.location.clone();

        tokio::task::spawn_blocking(move || {
            let mut guard = slot
                .lock()
                .map_err(|_| IndexError::Init("Offline index lock poisoned".to_string()))?;
            if guard.is_none() {
                *guard = Some(open_connection(&location)?);
                debug!("Opened offline index at {}", location);
            }
            let conn = guard
                .as_mut()
                .ok_or_else(|| IndexError::Init(format!("Offline index at {} is not open", location)))?;
            op(conn)
        })
        .await?
    }

    /// Replace the stored snapshot with `results`
    ///
    /// Returns the number of records stored (duplicate ids collapse, last wins).
    pub async fn build_index(&self, results: Vec<SearchResult>) -> Result<usize> {
        let batch_size = self.batch_size;

        self.with_connection(move |conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM search_records", [])?;

            let now = Utc::now();
            let stamp = now.to_rfc3339();
            {
                let mut stmt = tx.prepare(
                    "INSERT OR REPLACE INTO search_records (id, payload, searchable_text, last_updated)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;

                for (n, batch) in process_in_batches(&results, batch_size).iter().enumerate() {
                    for result in batch {
                        let record = IndexedRecord::new(result.clone(), now);
                        let payload = serde_json::to_string(&record.result)?;
                        stmt.execute(params![record.result.id, payload, record.searchable_text, stamp])?;
                    }
                    debug!("Indexed batch {} ({} records)", n + 1, batch.len());
                }
            }

            let stored: i64 = tx.query_row("SELECT COUNT(*) FROM search_records", [], |row| row.get(0))?;
            tx.commit()?;

            info!("Rebuilt offline index with {} records", stored);
            Ok(stored as usize)
        })
        .await
    }

    /// Every stored record, in insertion order
    pub async fn records(&self) -> Result<Vec<IndexedRecord>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT payload, searchable_text, last_updated FROM search_records ORDER BY rowid",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?;

            let mut records = Vec::new();
            for row in rows {
                let (payload, searchable_text, last_updated) = row?;
                records.push(IndexedRecord {
                    result: serde_json::from_str(&payload)?,
                    searchable_text,
                    last_updated: parse_timestamp(&last_updated),
                });
            }
            Ok(records)
        })
        .await
    }

    /// Stored results refined against `params.query`
    ///
    /// An empty query returns every stored result. Filters are not applied here.
    pub async fn search(&self, params: &SearchParams) -> Result<Vec<SearchResult>> {
        let candidates: Vec<SearchResult> = self
            .records()
            .await?
            .into_iter()
            .map(|record| record.result)
            .collect();

        Ok(self.matcher.search(candidates, params))
    }

    /// Look up one stored result by id
    pub async fn get(&self, id: &str) -> Result<Option<SearchResult>> {
        let id = id.to_string();
        self.with_connection(move |conn| {
            let payload: Option<String> = conn
                .query_row(
                    "SELECT payload FROM search_records WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            payload
                .map(|p| serde_json::from_str(&p))
                .transpose()
                .map_err(IndexError::from)
        })
        .await
    }

    pub async fn count(&self) -> Result<usize> {
        self.with_connection(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM search_records", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }

    /// Remove every record; the schema stays
    pub async fn clear_index(&self) -> Result<()> {
        self.with_connection(|conn| {
            let removed = conn.execute("DELETE FROM search_records", [])?;
            info!("Cleared offline index ({} records)", removed);
            Ok(())
        })
        .await
    }
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}
