use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StaffsyncError {
    #[error("Assignment error: {0}")]
    Assignment(#[from] crate::lifecycle::AssignmentError),

    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Cache error: {0}")]
    Cache(#[from] crate::cache::CacheError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

/// Errors raised while loading collections for a screen.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Registration '{0}' is not loaded and could not be fetched")]
    MissingRegistration(String),

    #[error("Malformed record at '{path}': {reason}")]
    Malformed { path: String, reason: String },
}

pub type Result<T> = std::result::Result<T, StaffsyncError>;
