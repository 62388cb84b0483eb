//! Remote record store seam.
//!
//! The hosted store is a hierarchical key-value tree addressed by
//! slash-separated paths. The engine only depends on this narrow contract:
//! single-path reads, a multi-path atomic fan-out write, and a single-path
//! write that is NOT atomic with anything else.

pub mod error;
pub mod memory;
pub mod paths;
pub mod plan;

use async_trait::async_trait;
use serde_json::Value;

pub use error::StoreError;
pub use memory::MemoryRecordStore;
pub use paths::StorePath;
pub use plan::WritePlan;

/// Contract of the remote hierarchical record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Reads the value at `path`; a prefix path returns the whole subtree.
    async fn read(&self, path: &StorePath) -> Result<Option<Value>, StoreError>;

    /// Applies every operation in the plan as one atomic unit. A `None`
    /// value deletes the path.
    async fn write_many(&self, plan: WritePlan) -> Result<(), StoreError>;

    /// Writes a single path. Not atomic with any other call.
    async fn write_one(&self, path: &StorePath, value: Value) -> Result<(), StoreError>;
}
