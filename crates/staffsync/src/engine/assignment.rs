//! Assignment engine: one method per life-cycle trigger.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde_json::Value;

use crate::cache::{CacheEntry, CacheStore, FreshnessPolicy};
use crate::config::Config;
use crate::error::{LoadError, Result, StaffsyncError};
use crate::index::{delete_plan, replace_applications_plan, transition_plan};
use crate::lifecycle::{plan_transition, AssignmentStatus, Transition};
use crate::model::application::JobApplication;
use crate::model::index::FlatIndexRecord;
use crate::model::registration::{ManagerRef, Registration, RegistrationKey};
use crate::store::{paths, RecordStore};

use super::overlay::OptimisticOverlay;

/// Cache key of the agency-wide flat index collection.
pub const REGISTRATIONS_CACHE_KEY: &str = "registrations_index";
/// Cache key of the client profile collection.
pub const CLIENTS_CACHE_KEY: &str = "client_profiles";

/// Drives the assignment life cycle against the remote store while
/// keeping the optimistic in-memory state and the local cache in step.
///
/// Mutations are last-write-wins: there is no conflict detection, no
/// retry and no lock, matching the hosted store's semantics.
pub struct AssignmentEngine<S, C> {
    pub(super) store: Arc<S>,
    pub(super) cache: Arc<C>,
    pub(super) registrations_policy: FreshnessPolicy,
    pub(super) clients_policy: FreshnessPolicy,
    pub(super) overlay: RwLock<OptimisticOverlay>,
}

impl<S, C> AssignmentEngine<S, C>
where
    S: RecordStore,
    C: CacheStore,
{
    pub fn new(store: Arc<S>, cache: Arc<C>, config: &Config) -> Self {
        Self {
            store,
            cache,
            registrations_policy: FreshnessPolicy::from_secs(
                config.cache.registrations_window_secs,
            ),
            clients_policy: FreshnessPolicy::from_secs(config.cache.clients_window_secs),
            overlay: RwLock::new(OptimisticOverlay::new()),
        }
    }

    /// The registration as the UI currently sees it.
    pub fn visible(&self, key: &RegistrationKey) -> Option<Registration> {
        self.overlay
            .read()
            .expect("overlay lock poisoned")
            .visible(key)
            .cloned()
    }

    /// Visible registrations per status, for badge display.
    pub fn status_counts(&self) -> BTreeMap<AssignmentStatus, usize> {
        self.overlay
            .read()
            .expect("overlay lock poisoned")
            .status_counts()
    }

    /// Screening accepted the registration.
    pub async fn accept(&self, key: &RegistrationKey) -> Result<Registration> {
        self.apply(key, Transition::Accept).await
    }

    /// Screening acceptance withdrawn.
    pub async fn unaccept(&self, key: &RegistrationKey) -> Result<Registration> {
        self.apply(key, Transition::Unaccept).await
    }

    /// Declines the registration; legal from any stage.
    pub async fn decline(&self, key: &RegistrationKey) -> Result<Registration> {
        self.apply(key, Transition::Decline).await
    }

    /// Re-enters a rejected registration at the manager-selection stage.
    pub async fn restore(&self, key: &RegistrationKey) -> Result<Registration> {
        self.apply(key, Transition::Restore).await
    }

    /// Saves a manager selection.
    pub async fn assign_manager(
        &self,
        key: &RegistrationKey,
        manager: ManagerRef,
    ) -> Result<Registration> {
        self.apply(key, Transition::AssignManager(manager)).await
    }

    /// Saves an employee selection (manager-facing flow).
    pub async fn assign_employee(
        &self,
        key: &RegistrationKey,
        employee_id: impl Into<String>,
    ) -> Result<Registration> {
        self.apply(key, Transition::AssignEmployee(employee_id.into()))
            .await
    }

    /// The assigned employee accepted the assignment.
    pub async fn confirm_assignment(&self, key: &RegistrationKey) -> Result<Registration> {
        self.apply(key, Transition::ConfirmAssignment).await
    }

    /// Flips an active registration to inactive and back.
    pub async fn toggle_activation(&self, key: &RegistrationKey) -> Result<Registration> {
        self.apply(key, Transition::ToggleActivation).await
    }

    async fn apply(&self, key: &RegistrationKey, transition: Transition) -> Result<Registration> {
        let before = self.current(key).await?;
        // Guard failures resolve locally; the store is never touched.
        let delta = plan_transition(before.status(), &transition, Utc::now())?;
        let (plan, after) = transition_plan(key, &before, &delta);

        // Optimistic: visible as soon as the write is issued.
        {
            let mut overlay = self.overlay.write().expect("overlay lock poisoned");
            overlay.stage(key, after.clone());
        }

        match self.store.write_many(plan).await {
            Ok(()) => {
                self.overlay
                    .write()
                    .expect("overlay lock poisoned")
                    .commit(key);
                self.patch_cached_index(key, Some(&after)).await;
                log::debug!("Applied '{}' to '{}'", transition.name(), key);
                Ok(after)
            }
            Err(e) => {
                self.overlay
                    .write()
                    .expect("overlay lock poisoned")
                    .revert(key);
                log::error!("Transition '{}' failed for '{}': {}", transition.name(), key, e);
                Err(e.into())
            }
        }
    }

    /// Permanently deletes a registration: primary record, flat index,
    /// reverse-index entries and the job-application collection go in one
    /// atomic write.
    pub async fn delete_registration(&self, key: &RegistrationKey) -> Result<()> {
        let before = self.current(key).await?;
        let plan = delete_plan(key, &before);

        {
            let mut overlay = self.overlay.write().expect("overlay lock poisoned");
            overlay.stage_remove(key);
        }

        match self.store.write_many(plan).await {
            Ok(()) => {
                self.overlay
                    .write()
                    .expect("overlay lock poisoned")
                    .commit(key);
                self.patch_cached_index(key, None).await;
                log::info!("Deleted registration '{}'", key);
                Ok(())
            }
            Err(e) => {
                self.overlay
                    .write()
                    .expect("overlay lock poisoned")
                    .revert(key);
                log::error!("Delete failed for '{}': {}", key, e);
                Err(e.into())
            }
        }
    }

    /// Replaces the whole job-application collection of a registration.
    pub async fn replace_applications(
        &self,
        key: &RegistrationKey,
        apps: Vec<JobApplication>,
    ) -> Result<()> {
        // The registration must exist; guard before writing.
        self.current(key).await?;
        let plan = replace_applications_plan(key, &apps);
        self.store.write_many(plan).await.map_err(|e| {
            log::error!("Application replacement failed for '{}': {}", key, e);
            StaffsyncError::from(e)
        })
    }

    /// The registration the next transition starts from: the visible
    /// in-memory state, or a one-off store read when nothing is loaded.
    pub(super) async fn current(&self, key: &RegistrationKey) -> Result<Registration> {
        if let Some(reg) = self.visible(key) {
            return Ok(reg);
        }

        let path = paths::registration(key);
        let value = self
            .store
            .read(&path)
            .await
            .map_err(StaffsyncError::from)?
            .ok_or_else(|| StaffsyncError::Load(LoadError::MissingRegistration(key.to_string())))?;
        let reg: Registration =
            serde_json::from_value(value).map_err(|e| {
                StaffsyncError::Load(LoadError::Malformed {
                    path: path.to_string(),
                    reason: e.to_string(),
                })
            })?;

        self.overlay
            .write()
            .expect("overlay lock poisoned")
            .seed(key, reg.clone());
        Ok(reg)
    }

    /// Best-effort merge-by-key patch of the cached flat collection, so a
    /// stale-but-not-yet-expired read does not show reverted data. The
    /// capture time is preserved: patching must not extend the entry's
    /// freshness. Failure never blocks the mutation that triggered it.
    async fn patch_cached_index(&self, key: &RegistrationKey, after: Option<&Registration>) {
        let entry = match self.cache.get(REGISTRATIONS_CACHE_KEY).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return,
            Err(e) => {
                log::warn!("Cache patch skipped, read failed: {}", e);
                return;
            }
        };

        let Value::Object(mut map) = entry.data else {
            log::warn!("Cache patch skipped, cached index is not an object");
            return;
        };
        match after {
            Some(reg) => {
                let record = FlatIndexRecord::project(key, reg);
                let value = serde_json::to_value(&record)
                    .expect("domain records serialize to JSON");
                map.insert(key.index_key(), value);
            }
            None => {
                map.remove(&key.index_key());
            }
        }

        let patched = CacheEntry::captured_at(Value::Object(map), entry.cached_at);
        if let Err(e) = self.cache.put(REGISTRATIONS_CACHE_KEY, patched).await {
            log::warn!("Cache patch failed for '{}': {}", key, e);
        }
    }
}
