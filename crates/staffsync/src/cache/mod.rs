//! Local cache store.
//!
//! A persistent key → `{data, cachedAt}` store on the client device, used
//! to avoid re-fetching large collections on cold start. Cache failures
//! never block a primary flow: a failed read degrades to a miss, a failed
//! write is logged and dropped.

pub mod error;
pub mod memory;
pub mod policy;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use error::CacheError;
pub use memory::MemoryCacheStore;
pub use policy::FreshnessPolicy;
pub use sqlite::{default_cache_path, SqliteCacheStore};

/// One cached collection with its capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub data: Value,
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Captures `data` as of now.
    pub fn new(data: Value) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn captured_at(data: Value, cached_at: DateTime<Utc>) -> Self {
        Self { data, cached_at }
    }
}

/// Contract of the on-device cache store.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;
    async fn put(&self, key: &str, entry: CacheEntry) -> Result<(), CacheError>;
}
