//! SQLite-backed local cache store.
//!
//! A single `cache_entries` table behind a thread-safe handle. Cloning is
//! cheap (inner `Arc`); all access is serialized through a `Mutex`, which
//! is fine for SQLite. WAL mode is enabled for concurrent read
//! performance. The async trait methods hop to the blocking pool so the
//! calling flow is never blocked.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::error::{CacheError, Result};
use super::{CacheEntry, CacheStore};

#[derive(Clone)]
pub struct SqliteCacheStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCacheStore {
    /// Opens (or creates) the cache database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init_schema(&conn)?;

        log::info!("Cache store opened at {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory cache for testing.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS cache_entries (
                key TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                cached_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|_| CacheError::LockPoisoned)?;
        f(&conn)
    }

    fn get_sync(&self, key: &str) -> Result<Option<CacheEntry>> {
        let row: Option<(String, String)> = self.with_conn(|conn| {
            conn.query_row(
                "SELECT data, cached_at FROM cache_entries WHERE key = ?1",
                params![key],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()
            .map_err(CacheError::Sqlite)
        })?;

        let Some((data, cached_at)) = row else {
            return Ok(None);
        };

        // A row we cannot decode is a miss, not a failure.
        let data = match serde_json::from_str(&data) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Dropping undecodable cache entry '{}': {}", key, e);
                return Ok(None);
            }
        };
        let cached_at = match DateTime::parse_from_rfc3339(&cached_at) {
            Ok(ts) => ts.with_timezone(&Utc),
            Err(e) => {
                log::warn!("Dropping cache entry '{}' with bad timestamp: {}", key, e);
                return Ok(None);
            }
        };

        Ok(Some(CacheEntry { data, cached_at }))
    }

    fn put_sync(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        let data = serde_json::to_string(&entry.data)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO cache_entries (key, data, cached_at)
                 VALUES (?1, ?2, ?3)",
                params![key, data, entry.cached_at.to_rfc3339()],
            )?;
            Ok(())
        })
    }
}

#[async_trait]
impl CacheStore for SqliteCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let store = self.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || store.get_sync(&key))
            .await
            .map_err(|e| CacheError::Runtime(e.to_string()))?
    }

    async fn put(&self, key: &str, entry: CacheEntry) -> Result<()> {
        let store = self.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || store.put_sync(&key, &entry))
            .await
            .map_err(|e| CacheError::Runtime(e.to_string()))?
    }
}

/// Returns the canonical cache path: `~/.staffsync/data/cache.db`.
pub fn default_cache_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".staffsync").join("data").join("cache.db"))
}
