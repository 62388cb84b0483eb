//! Record store error types.

use thiserror::Error;

/// Network or store failure on a read or write.
///
/// Store errors are logged and surfaced to the caller; the core never
/// retries them.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store read failed at '{path}': {message}")]
    ReadFailed { path: String, message: String },

    #[error("Store write failed: {message}")]
    WriteFailed { message: String },
}

/// Result type for record store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
