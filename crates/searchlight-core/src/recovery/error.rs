//! Structured search errors

use serde::{Deserialize, Serialize};

use crate::storage::IndexError;

// ============================================================================
// ERROR KIND
// ============================================================================

/// Error class, which decides how recovery treats the error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed params; raised before any work, never recovered
    Validation,
    /// Delegate unreachable; recovered from the offline index
    Network,
    /// Delegate too slow; recovered from the offline index
    Timeout,
    /// Durable snapshot could not be written; last-known-good data is kept
    Sync,
    /// Anything else; rethrown
    Search,
}

impl ErrorKind {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::Timeout => "TIMEOUT_ERROR",
            ErrorKind::Sync => "SYNC_ERROR",
            ErrorKind::Search => "SEARCH_ERROR",
        }
    }

    /// Whether the delegate call may succeed if attempted again
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorKind::Network | ErrorKind::Timeout)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for ErrorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "VALIDATION_ERROR" => Ok(ErrorKind::Validation),
            "NETWORK_ERROR" => Ok(ErrorKind::Network),
            "TIMEOUT_ERROR" => Ok(ErrorKind::Timeout),
            "SYNC_ERROR" => Ok(ErrorKind::Sync),
            "SEARCH_ERROR" => Ok(ErrorKind::Search),
            _ => Err(format!("Unknown error code: {}", s)),
        }
    }
}

// ============================================================================
// SEARCH ERROR
// ============================================================================

/// Error raised by any public search operation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct SearchError {
    pub kind: ErrorKind,
    pub message: String,
    pub details: Option<String>,
}

impl SearchError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn sync(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Sync, message)
    }

    pub fn search(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Search, message)
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Wrap an index failure that happened while writing a snapshot
    pub fn from_sync_failure(err: IndexError) -> Self {
        Self::sync("Failed to write offline index snapshot").with_details(err.to_string())
    }
}

impl From<IndexError> for SearchError {
    fn from(err: IndexError) -> Self {
        Self::search("Offline index operation failed").with_details(err.to_string())
    }
}

/// Search result type
pub type Result<T> = std::result::Result<T, SearchError>;
