//! Screen-level bulk loads.
//!
//! Dashboards load through the reverse index: one small collection read,
//! then a parallel primary + applications read per entry, joined and
//! bucketed. Agency-wide screens go cache-first with a per-collection
//! staleness window. Loads carry a cancellation flag captured at effect
//! start and checked before every state update, so a teardown mid-flight
//! discards the result instead of updating dead state. There is no
//! timeout and no retry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use serde_json::{Map, Value};

use crate::cache::{CacheEntry, CacheStore};
use crate::error::Result;
use crate::lifecycle::AssignmentStatus;
use crate::model::application::JobApplication;
use crate::model::client::Client;
use crate::model::index::{FlatIndexRecord, ReverseIndexEntry};
use crate::model::registration::{Registration, RegistrationKey};
use crate::store::{paths, RecordStore, StorePath};

use super::assignment::{AssignmentEngine, CLIENTS_CACHE_KEY, REGISTRATIONS_CACHE_KEY};

/// Cooperative cancellation for one in-flight load.
///
/// The only cancellation mechanism in the core: a screen captures the
/// flag when its effect starts and flips it on teardown.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One registration joined with its job-application collection.
#[derive(Debug, Clone)]
pub struct JoinedRegistration {
    pub key: RegistrationKey,
    pub registration: Registration,
    pub applications: Vec<JobApplication>,
}

/// Role-scoped dashboard collections.
///
/// The three buckets are disjoint; `applications` flattens every joined
/// collection and `interviews` is its `status == "Interview"` subset.
#[derive(Debug, Default)]
pub struct DashboardBuckets {
    pub unassigned: Vec<JoinedRegistration>,
    pub active: Vec<JoinedRegistration>,
    pub inactive: Vec<JoinedRegistration>,
    pub applications: Vec<JobApplication>,
    pub interviews: Vec<JobApplication>,
}

impl DashboardBuckets {
    fn push(&mut self, joined: JoinedRegistration) {
        self.applications.extend(joined.applications.iter().cloned());
        self.interviews
            .extend(joined.applications.iter().filter(|a| a.is_interview()).cloned());
        match joined.registration.status() {
            AssignmentStatus::PendingEmployee | AssignmentStatus::PendingAcceptance => {
                self.unassigned.push(joined);
            }
            AssignmentStatus::Active => self.active.push(joined),
            AssignmentStatus::Inactive => self.inactive.push(joined),
            other => {
                log::debug!(
                    "Dropping '{}' from dashboard, status '{}' has no bucket",
                    joined.key,
                    other
                );
            }
        }
    }

    pub fn len(&self) -> usize {
        self.unassigned.len() + self.active.len() + self.inactive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse_entries(collection: Option<Value>, path: &StorePath) -> Vec<ReverseIndexEntry> {
    let Some(Value::Object(map)) = collection else {
        return Vec::new();
    };
    map.into_iter()
        .filter_map(|(id, value)| match serde_json::from_value(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping malformed entry '{}' under '{}': {}", id, path, e);
                None
            }
        })
        .collect()
}

fn parse_applications(value: Option<Value>, key: &RegistrationKey) -> Vec<JobApplication> {
    match value {
        None => Vec::new(),
        Some(value) => match serde_json::from_value(value) {
            Ok(apps) => apps,
            Err(e) => {
                log::warn!("Skipping malformed application collection for '{}': {}", key, e);
                Vec::new()
            }
        },
    }
}

impl<S, C> AssignmentEngine<S, C>
where
    S: RecordStore,
    C: CacheStore,
{
    /// Loads a manager's dashboard through the manager reverse index.
    pub async fn load_manager_dashboard(
        &self,
        manager_id: &str,
        cancel: &CancelFlag,
    ) -> Result<Option<DashboardBuckets>> {
        let index_path = paths::manager_index(manager_id);
        let principal = manager_id.to_string();
        self.load_dashboard(index_path, cancel, move |reg: &Registration| {
            reg.assigned_manager
                .as_ref()
                .is_some_and(|m| m.id == principal)
        })
        .await
    }

    /// Loads an employee's dashboard through the employee reverse index.
    pub async fn load_employee_dashboard(
        &self,
        employee_id: &str,
        cancel: &CancelFlag,
    ) -> Result<Option<DashboardBuckets>> {
        let index_path = paths::employee_index(employee_id);
        let principal = employee_id.to_string();
        self.load_dashboard(index_path, cancel, move |reg: &Registration| {
            reg.assigned_to.as_deref() == Some(principal.as_str())
        })
        .await
    }

    async fn load_dashboard(
        &self,
        index_path: StorePath,
        cancel: &CancelFlag,
        belongs_to_principal: impl Fn(&Registration) -> bool,
    ) -> Result<Option<DashboardBuckets>> {
        let collection = self.store.read(&index_path).await?;
        let entries = parse_entries(collection, &index_path);

        // One parallel primary + applications read per entry.
        let reads = entries.iter().map(|entry| {
            let key = entry.key();
            let store = &self.store;
            async move {
                let reg_path = paths::registration(&key);
                let apps_path = paths::applications(&key);
                let (reg, apps) = tokio::join!(
                    store.read(&reg_path),
                    store.read(&apps_path)
                );
                (key, reg, apps)
            }
        });
        let results = join_all(reads).await;

        let mut buckets = DashboardBuckets::default();
        let mut joined_rows = Vec::new();
        for (key, reg, apps) in results {
            let reg_path = paths::registration(&key);
            let registration: Registration = match reg? {
                Some(value) => match serde_json::from_value(value) {
                    Ok(reg) => reg,
                    Err(e) => {
                        log::warn!("Skipping malformed registration at '{}': {}", reg_path, e);
                        continue;
                    }
                },
                None => {
                    log::warn!("Reverse index points at missing registration '{}'", key);
                    continue;
                }
            };

            // Defensive re-check against a stale reverse-index entry.
            if !belongs_to_principal(&registration) {
                log::debug!("Dropping '{}', no longer held by this principal", key);
                continue;
            }

            let applications = parse_applications(apps?, &key);
            joined_rows.push(JoinedRegistration {
                key,
                registration,
                applications,
            });
        }

        // Captured at effect start; a teardown mid-flight discards the load.
        if cancel.is_cancelled() {
            log::debug!("Dashboard load for '{}' cancelled, discarding", index_path);
            return Ok(None);
        }

        {
            let mut overlay = self.overlay.write().expect("overlay lock poisoned");
            for row in &joined_rows {
                overlay.seed(&row.key, row.registration.clone());
            }
        }
        for row in joined_rows {
            buckets.push(row);
        }
        Ok(Some(buckets))
    }

    /// Loads the agency-wide flat index, cache-first.
    ///
    /// A fresh cache hit is served verbatim; otherwise the store is read
    /// once and the cache is rewritten with a new capture time. A cache
    /// failure degrades to a miss and never blocks the load.
    pub async fn load_registration_index(
        &self,
        cancel: &CancelFlag,
    ) -> Result<Option<Vec<FlatIndexRecord>>> {
        let now = Utc::now();
        match self.cache.get(REGISTRATIONS_CACHE_KEY).await {
            Ok(Some(entry)) if self.registrations_policy.is_fresh(&entry, now) => {
                log::debug!("Serving registration index from cache");
                if cancel.is_cancelled() {
                    return Ok(None);
                }
                return Ok(Some(parse_flat_records(&entry.data)));
            }
            Ok(_) => {}
            Err(e) => log::warn!("Cache read failed, treating as miss: {}", e),
        }

        let data = self
            .store
            .read(&paths::flat_index_root())
            .await?
            .unwrap_or(Value::Object(Map::new()));
        let records = parse_flat_records(&data);

        if cancel.is_cancelled() {
            log::debug!("Registration index load cancelled, discarding");
            return Ok(None);
        }

        let entry = CacheEntry::captured_at(data, now);
        if let Err(e) = self.cache.put(REGISTRATIONS_CACHE_KEY, entry).await {
            log::warn!("Cache write-back failed: {}", e);
        }
        Ok(Some(records))
    }

    /// Loads every client profile, cache-first under its own window.
    pub async fn load_clients(&self, cancel: &CancelFlag) -> Result<Option<Vec<Client>>> {
        let now = Utc::now();
        match self.cache.get(CLIENTS_CACHE_KEY).await {
            Ok(Some(entry)) if self.clients_policy.is_fresh(&entry, now) => {
                log::debug!("Serving client profiles from cache");
                if cancel.is_cancelled() {
                    return Ok(None);
                }
                return Ok(Some(parse_clients(&entry.data)));
            }
            Ok(_) => {}
            Err(e) => log::warn!("Cache read failed, treating as miss: {}", e),
        }

        let data = self
            .store
            .read(&paths::records_root())
            .await?
            .unwrap_or(Value::Object(Map::new()));
        let clients = parse_clients(&data);

        if cancel.is_cancelled() {
            log::debug!("Client profile load cancelled, discarding");
            return Ok(None);
        }

        let entry = CacheEntry::captured_at(data, now);
        if let Err(e) = self.cache.put(CLIENTS_CACHE_KEY, entry).await {
            log::warn!("Cache write-back failed: {}", e);
        }
        Ok(Some(clients))
    }
}

fn parse_flat_records(data: &Value) -> Vec<FlatIndexRecord> {
    let Some(map) = data.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|(id, value)| match serde_json::from_value(value.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping malformed flat index record '{}': {}", id, e);
                None
            }
        })
        .collect()
}

fn parse_clients(data: &Value) -> Vec<Client> {
    let Some(map) = data.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|(id, value)| {
            let client = Client::from_value(id, value);
            if client.is_none() {
                log::warn!("Skipping malformed client profile '{}'", id);
            }
            client
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use serde_json::json;
    use std::sync::Arc;

    use crate::cache::{CacheError, MemoryCacheStore};
    use crate::config::Config;
    use crate::index::upsert_plan;
    use crate::model::registration::{ManagerRef, ServiceKind};
    use crate::store::MemoryRecordStore;

    fn registration(
        status: AssignmentStatus,
        manager: Option<&str>,
        employee: Option<&str>,
    ) -> Registration {
        let mut reg = Registration::new(ServiceKind::JobPlacement);
        reg.assignment_status = Some(status);
        reg.client_name = Some("Dana Okafor".to_string());
        reg.assigned_manager = manager.map(|id| ManagerRef::new(id, "Priya Shah"));
        reg.assigned_to = employee.map(str::to_string);
        reg
    }

    async fn seeded_engine() -> AssignmentEngine<MemoryRecordStore, MemoryCacheStore> {
        let store = Arc::new(MemoryRecordStore::new());

        let k1 = RegistrationKey::new("c1", "r1");
        let r1 = registration(AssignmentStatus::PendingEmployee, Some("m1"), None);
        store.write_many(upsert_plan(&k1, &r1)).await.unwrap();

        let k2 = RegistrationKey::new("c2", "r2");
        let r2 = registration(AssignmentStatus::Active, Some("m1"), Some("e1"));
        store.write_many(upsert_plan(&k2, &r2)).await.unwrap();
        store
            .write_one(
                &paths::applications(&k2),
                json!([
                    { "company": "Acme", "title": "Backend Engineer", "status": "Applied" },
                    { "company": "Globex", "title": "Data Analyst", "status": "Interview" }
                ]),
            )
            .await
            .unwrap();

        let k3 = RegistrationKey::new("c3", "r3");
        let r3 = registration(AssignmentStatus::Inactive, Some("m1"), Some("e1"));
        store.write_many(upsert_plan(&k3, &r3)).await.unwrap();

        AssignmentEngine::new(store, Arc::new(MemoryCacheStore::new()), &Config::default())
    }

    #[tokio::test]
    async fn test_manager_dashboard_buckets() {
        let engine = seeded_engine().await;
        let buckets = engine
            .load_manager_dashboard("m1", &CancelFlag::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(buckets.unassigned.len(), 1);
        assert_eq!(buckets.active.len(), 1);
        assert_eq!(buckets.inactive.len(), 1);
        assert_eq!(buckets.applications.len(), 2);
        assert_eq!(buckets.interviews.len(), 1);
        assert_eq!(buckets.interviews[0].company, "Globex");

        // The load seeded the in-memory state.
        assert!(engine
            .visible(&RegistrationKey::new("c2", "r2"))
            .is_some());
    }

    #[tokio::test]
    async fn test_stale_reverse_entry_is_discarded() {
        let engine = seeded_engine().await;

        // A leftover entry under m9 for a registration m1 now holds.
        engine
            .store
            .write_one(
                &StorePath::new("manager_index/m9/c1_r1"),
                json!({
                    "clientId": "c1",
                    "registrationId": "r1",
                    "assignmentStatus": "pending_employee"
                }),
            )
            .await
            .unwrap();

        let buckets = engine
            .load_manager_dashboard("m9", &CancelFlag::new())
            .await
            .unwrap()
            .unwrap();
        assert!(buckets.is_empty());
    }

    #[tokio::test]
    async fn test_employee_dashboard_scope() {
        let engine = seeded_engine().await;
        let buckets = engine
            .load_employee_dashboard("e1", &CancelFlag::new())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(buckets.unassigned.len(), 0);
        assert_eq!(buckets.active.len(), 1);
        assert_eq!(buckets.inactive.len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_dashboard_load_discards_result() {
        let engine = seeded_engine().await;
        let cancel = CancelFlag::new();
        cancel.cancel();

        let result = engine.load_manager_dashboard("m1", &cancel).await.unwrap();
        assert!(result.is_none());
        // No state update happened.
        assert!(engine.visible(&RegistrationKey::new("c1", "r1")).is_none());
    }

    #[tokio::test]
    async fn test_fresh_cache_hit_served_verbatim() {
        let engine = seeded_engine().await;

        // Cache holds a record the store does not; a hit must not refetch.
        engine
            .cache
            .put(
                REGISTRATIONS_CACHE_KEY,
                CacheEntry::new(json!({
                    "c9_r9": { "clientId": "c9", "registrationId": "r9", "service": "visa_support" }
                })),
            )
            .await
            .unwrap();

        let records = engine
            .load_registration_index(&CancelFlag::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].client_id, "c9");
    }

    #[tokio::test]
    async fn test_stale_cache_refetches_and_writes_back() {
        let engine = seeded_engine().await;
        let stale_at = Utc::now() - Duration::hours(1);
        engine
            .cache
            .put(
                REGISTRATIONS_CACHE_KEY,
                CacheEntry::captured_at(json!({}), stale_at),
            )
            .await
            .unwrap();

        let records = engine
            .load_registration_index(&CancelFlag::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(records.len(), 3);

        let entry = engine
            .cache
            .get(REGISTRATIONS_CACHE_KEY)
            .await
            .unwrap()
            .unwrap();
        assert!(entry.cached_at > stale_at);
        assert_eq!(entry.data.as_object().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_cancelled_index_load_skips_write_back() {
        let engine = seeded_engine().await;
        let cancel = CancelFlag::new();
        cancel.cancel();

        let result = engine.load_registration_index(&cancel).await.unwrap();
        assert!(result.is_none());
        assert!(engine
            .cache
            .get(REGISTRATIONS_CACHE_KEY)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_load_clients_from_store() {
        let engine = seeded_engine().await;
        engine
            .store
            .write_one(
                &StorePath::new("records/c1/name"),
                json!("Dana Okafor"),
            )
            .await
            .unwrap();

        let clients = engine
            .load_clients(&CancelFlag::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].id, "c1");
    }

    /// A cache whose reads always fail; the loaders must degrade to a miss.
    struct BrokenCache;

    #[async_trait]
    impl CacheStore for BrokenCache {
        async fn get(&self, _key: &str) -> std::result::Result<Option<CacheEntry>, CacheError> {
            Err(CacheError::Runtime("cache offline".to_string()))
        }

        async fn put(&self, _key: &str, _entry: CacheEntry) -> std::result::Result<(), CacheError> {
            Err(CacheError::Runtime("cache offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_cache_failure_never_blocks_the_load() {
        let store = Arc::new(MemoryRecordStore::new());
        let k = RegistrationKey::new("c1", "r1");
        let reg = registration(AssignmentStatus::Active, Some("m1"), None);
        store.write_many(upsert_plan(&k, &reg)).await.unwrap();

        let engine = AssignmentEngine::new(store, Arc::new(BrokenCache), &Config::default());
        let records = engine
            .load_registration_index(&CancelFlag::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(records.len(), 1);
    }
}
