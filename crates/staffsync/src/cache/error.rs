//! Cache store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Local cache store failure.
///
/// Callers log these and fall back to treating the cache as empty; a
/// cache failure never blocks the primary flow.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to create directory '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache store mutex poisoned")]
    LockPoisoned,

    #[error("Failed to encode cache entry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Cache task failed: {0}")]
    Runtime(String),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
