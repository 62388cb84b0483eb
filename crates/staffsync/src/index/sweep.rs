//! Reverse-index reconciliation sweep.
//!
//! Detects and repairs drift between the flat index and the two reverse
//! indices: entries missing for an assigned principal, entries left under
//! a principal that no longer holds the registration, and entries whose
//! projected fields went stale. Every divergence is logged.

use std::collections::BTreeMap;

use log::{info, warn};
use serde_json::Value;

use crate::model::index::{FlatIndexRecord, ReverseIndexEntry};
use crate::store::error::Result;
use crate::store::paths::{self, StorePath};
use crate::store::plan::WritePlan;
use crate::store::RecordStore;

/// Outcome of one sweep pass.
#[derive(Debug)]
pub struct SweepReport {
    /// Flat index records examined.
    pub scanned: usize,
    /// Divergent reverse-index entries found.
    pub divergences: usize,
    /// The plan that repairs them; empty when the indices are consistent.
    pub repairs: WritePlan,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.divergences == 0
    }
}

async fn read_collection<S: RecordStore + ?Sized>(
    store: &S,
    path: StorePath,
) -> Result<serde_json::Map<String, Value>> {
    match store.read(&path).await? {
        Some(Value::Object(map)) => Ok(map),
        Some(other) => {
            warn!("Expected an object at '{}', found {:?}; treating as empty", path, other);
            Ok(serde_json::Map::new())
        }
        None => Ok(serde_json::Map::new()),
    }
}

fn diff_index(
    root: &str,
    actual: &serde_json::Map<String, Value>,
    mut expected: BTreeMap<(String, String), Value>,
    plan: &mut WritePlan,
    divergences: &mut usize,
) {
    for (principal, entries) in actual {
        let Some(entries) = entries.as_object() else {
            continue;
        };
        for (index_key, actual_entry) in entries {
            let path = StorePath::new(format!("{}/{}/{}", root, principal, index_key));
            match expected.remove(&(principal.clone(), index_key.clone())) {
                Some(wanted) if wanted == *actual_entry => {}
                Some(wanted) => {
                    warn!("Stale entry at '{}', rewriting", path);
                    plan.set(path, wanted);
                    *divergences += 1;
                }
                None => {
                    warn!("Orphaned entry at '{}', removing", path);
                    plan.delete(path);
                    *divergences += 1;
                }
            }
        }
    }
    for ((principal, index_key), wanted) in expected {
        let path = StorePath::new(format!("{}/{}/{}", root, principal, index_key));
        warn!("Missing entry at '{}', writing", path);
        plan.set(path, wanted);
        *divergences += 1;
    }
}

/// Scans the flat index and diffs both reverse indices against it.
///
/// Read-only; apply `repairs` with [`repair`] or `write_many` to fix the
/// store.
pub async fn sweep<S: RecordStore + ?Sized>(store: &S) -> Result<SweepReport> {
    let flat = read_collection(store, paths::flat_index_root()).await?;
    let managers = read_collection(store, StorePath::new(paths::MANAGER_INDEX_ROOT)).await?;
    let employees = read_collection(store, StorePath::new(paths::EMPLOYEE_INDEX_ROOT)).await?;

    let mut expected_managers: BTreeMap<(String, String), Value> = BTreeMap::new();
    let mut expected_employees: BTreeMap<(String, String), Value> = BTreeMap::new();
    let mut scanned = 0usize;

    for (index_key, value) in &flat {
        let record: FlatIndexRecord = match serde_json::from_value(value.clone()) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping malformed flat index record '{}': {}", index_key, e);
                continue;
            }
        };
        scanned += 1;

        let entry = ReverseIndexEntry {
            client_id: record.client_id.clone(),
            registration_id: record.registration_id.clone(),
            display_name: record.client_name.clone(),
            assignment_status: record.assignment_status.unwrap_or_default(),
        };
        let entry_json =
            serde_json::to_value(&entry).expect("domain records serialize to JSON");

        if let Some(manager) = &record.assigned_manager {
            expected_managers.insert(
                (manager.id.clone(), index_key.clone()),
                entry_json.clone(),
            );
        }
        if let Some(employee) = &record.assigned_to {
            expected_employees.insert((employee.clone(), index_key.clone()), entry_json);
        }
    }

    let mut plan = WritePlan::new();
    let mut divergences = 0usize;
    diff_index(
        paths::MANAGER_INDEX_ROOT,
        &managers,
        expected_managers,
        &mut plan,
        &mut divergences,
    );
    diff_index(
        paths::EMPLOYEE_INDEX_ROOT,
        &employees,
        expected_employees,
        &mut plan,
        &mut divergences,
    );

    Ok(SweepReport {
        scanned,
        divergences,
        repairs: plan,
    })
}

/// Sweeps and applies the repair plan in one atomic write.
pub async fn repair<S: RecordStore + ?Sized>(store: &S) -> Result<SweepReport> {
    let report = sweep(store).await?;
    if !report.repairs.is_empty() {
        info!(
            "Repairing {} divergent reverse-index entries",
            report.divergences
        );
        store.write_many(report.repairs.clone()).await?;
    }
    Ok(report)
}
