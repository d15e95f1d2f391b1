// ==========================================
// Deportation Registry - Store error types
// ==========================================
// Tool: thiserror derive macro
// ==========================================

use thiserror::Error;

/// Record store error type.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("database lock poisoned: {0}")]
    Lock(String),

    #[error("database query failed: {0}")]
    Query(String),

    #[error("no current version for running number {0}")]
    CurrentVersionNotFound(i64),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Query(err.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
