pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod store;

pub use cache::{CacheEntry, CacheError, CacheStore, FreshnessPolicy, MemoryCacheStore, SqliteCacheStore};
pub use config::{load_config, CacheConfig, Config};
pub use engine::{AssignmentEngine, CancelFlag, DashboardBuckets, JoinedRegistration, OptimisticOverlay};
pub use error::{ConfigError, LoadError, Result, StaffsyncError};
pub use index::{repair, sweep, SweepReport};
pub use lifecycle::{AssignmentError, AssignmentStatus, StatusDelta, Transition};
pub use model::{Client, FlatIndexRecord, JobApplication, ManagerRef, Registration, RegistrationKey, ReverseIndexEntry, ServiceKind};
pub use store::{MemoryRecordStore, RecordStore, StoreError, StorePath, WritePlan};
