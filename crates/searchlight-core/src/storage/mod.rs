//! Storage Module
//!
//! SQLite-backed durable state:
//! - Offline index of search results (full-replace snapshots)
//! - Key-value preferences (search history)
//! - Versioned schema migrations shared by both

mod index;
mod migrations;
mod preferences;

pub use index::{IndexedRecord, OfflineIndex};
pub use migrations::{MIGRATIONS, Migration, apply_migrations, get_current_version};
pub use preferences::{MemoryPreferences, PreferenceStore, SqlitePreferences};

use rusqlite::Connection;

use crate::config::IndexLocation;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Stored payload could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Store could not be opened or initialized
    #[error("Initialization error: {0}")]
    Init(String),
    /// Background task panicked or was cancelled
    #[error("Background task failed: {0}")]
    TaskJoin(String),
}

impl From<tokio::task::JoinError> for IndexError {
    fn from(err: tokio::task::JoinError) -> Self {
        IndexError::TaskJoin(err.to_string())
    }
}

/// Storage result type
pub type Result<T> = std::result::Result<T, IndexError>;

// ============================================================================
// CONNECTIONS
// ============================================================================

/// Apply PRAGMAs to a connection
fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA cache_size = -16000;
         PRAGMA temp_store = MEMORY;
         PRAGMA busy_timeout = 5000;",
    )
}

/// Open, configure and migrate the database at `location`
///
/// Every failure is reported as `IndexError::Init` with the location.
pub(crate) fn open_connection(location: &IndexLocation) -> Result<Connection> {
    let init_error = |what: &str, err: &dyn std::fmt::Display| {
        IndexError::Init(format!("{} at {}: {}", what, location, err))
    };

    let conn = match location {
        IndexLocation::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .map_err(|e| init_error("Could not create data directory", &e))?;
            }
            let conn = Connection::open(path)
                .map_err(|e| init_error("Could not open offline index", &e))?;

            // Restrict database file permissions to owner-only on Unix
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let perms = std::fs::Permissions::from_mode(0o600);
                let _ = std::fs::set_permissions(path, perms);
            }
            conn
        }
        IndexLocation::InMemory => Connection::open_in_memory()
            .map_err(|e| init_error("Could not open offline index", &e))?,
    };

    configure_connection(&conn).map_err(|e| init_error("Could not configure offline index", &e))?;
    apply_migrations(&conn).map_err(|e| init_error("Could not migrate offline index", &e))?;

    Ok(conn)
}
