//! Write-plan builders.

use serde_json::Value;

use crate::lifecycle::{FieldChange, StatusDelta};
use crate::model::application::JobApplication;
use crate::model::index::{FlatIndexRecord, ReverseIndexEntry};
use crate::model::registration::{Registration, RegistrationKey};
use crate::store::paths;
use crate::store::plan::WritePlan;

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).expect("domain records serialize to JSON")
}

/// Writes one field on the primary registration and, in the same plan,
/// the identical field on the flat index record. The two must stay
/// byte-for-byte equal.
fn set_mirrored(plan: &mut WritePlan, key: &RegistrationKey, field: &str, value: Value) {
    plan.set(paths::registration_field(key, field), value.clone());
    plan.set(paths::flat_index_field(key, field), value);
}

fn clear_mirrored(plan: &mut WritePlan, key: &RegistrationKey, field: &str) {
    plan.delete(paths::registration_field(key, field));
    plan.delete(paths::flat_index_field(key, field));
}

fn apply_field_change<T: serde::Serialize>(
    plan: &mut WritePlan,
    key: &RegistrationKey,
    field: &str,
    change: &FieldChange<T>,
) {
    match change {
        FieldChange::Keep => {}
        FieldChange::Set(v) => set_mirrored(plan, key, field, to_json(v)),
        FieldChange::Clear => clear_mirrored(plan, key, field),
    }
}

/// Maintains the reverse-index entries for the transition from `before`
/// to `after`.
///
/// An entry under a principal that no longer holds the registration is
/// nulled in the same plan that writes the new one, so the registration
/// never appears under two managers (or employees) at once, and a
/// surviving entry is rewritten so it never carries a stale status.
fn maintain_reverse_indices(
    plan: &mut WritePlan,
    key: &RegistrationKey,
    before: &Registration,
    after: &Registration,
) {
    let entry = ReverseIndexEntry::project(key, after);

    let old_manager = before.assigned_manager.as_ref().map(|m| m.id.as_str());
    let new_manager = after.assigned_manager.as_ref().map(|m| m.id.as_str());
    if let Some(old) = old_manager {
        if new_manager != Some(old) {
            plan.delete(paths::manager_index_entry(old, key));
        }
    }
    if let Some(new) = new_manager {
        plan.set(paths::manager_index_entry(new, key), to_json(&entry));
    }

    let old_employee = before.assigned_to.as_deref();
    let new_employee = after.assigned_to.as_deref();
    if let Some(old) = old_employee {
        if new_employee != Some(old) {
            plan.delete(paths::employee_index_entry(old, key));
        }
    }
    if let Some(new) = new_employee {
        plan.set(paths::employee_index_entry(new, key), to_json(&entry));
    }
}

/// Computes the full fan-out write for one transition.
///
/// Returns the plan and the registration as it will read after the write.
/// Every primary field write is paired with its flat-index mirror, and
/// reverse-index maintenance rides in the same atomic plan — including
/// the employee entry.
pub fn transition_plan(
    key: &RegistrationKey,
    before: &Registration,
    delta: &StatusDelta,
) -> (WritePlan, Registration) {
    let mut after = before.clone();
    delta.apply_to(&mut after);

    let mut plan = WritePlan::new();
    set_mirrored(
        &mut plan,
        key,
        "assignmentStatus",
        to_json(&delta.status),
    );
    apply_field_change(&mut plan, key, "assignedManager", &delta.manager);
    apply_field_change(&mut plan, key, "assignedTo", &delta.assigned_to);
    apply_field_change(&mut plan, key, "assignedDate", &delta.assigned_date);

    maintain_reverse_indices(&mut plan, key, before, &after);

    (plan, after)
}

/// Writes the whole registration and its projections, used when a record
/// enters the system or is rewritten wholesale.
pub fn upsert_plan(key: &RegistrationKey, reg: &Registration) -> WritePlan {
    let mut plan = WritePlan::new();
    plan.set(paths::registration(key), to_json(reg));
    plan.set(
        paths::flat_index(key),
        to_json(&FlatIndexRecord::project(key, reg)),
    );

    let entry = ReverseIndexEntry::project(key, reg);
    if let Some(manager) = &reg.assigned_manager {
        plan.set(paths::manager_index_entry(&manager.id, key), to_json(&entry));
    }
    if let Some(employee) = &reg.assigned_to {
        plan.set(paths::employee_index_entry(employee, key), to_json(&entry));
    }
    plan
}

/// Permanent delete: nulls the primary record, the flat index record, the
/// job-application collection and any reverse-index entries in one atomic
/// plan, so no partial state is observable by a subsequent read.
pub fn delete_plan(key: &RegistrationKey, before: &Registration) -> WritePlan {
    let mut plan = WritePlan::new();
    plan.delete(paths::registration(key));
    plan.delete(paths::flat_index(key));
    plan.delete(paths::applications(key));
    if let Some(manager) = &before.assigned_manager {
        plan.delete(paths::manager_index_entry(&manager.id, key));
    }
    if let Some(employee) = &before.assigned_to {
        plan.delete(paths::employee_index_entry(employee, key));
    }
    plan
}

/// Replaces the whole job-application collection of a registration.
pub fn replace_applications_plan(key: &RegistrationKey, apps: &[JobApplication]) -> WritePlan {
    let mut plan = WritePlan::new();
    plan.set(paths::applications(key), to_json(&apps));
    plan
}
