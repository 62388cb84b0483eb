//! Denormalized projections of a registration.
//!
//! The flat index backs agency-wide listing and search; the reverse index
//! entries let a manager or employee dashboard load without scanning every
//! registration. Both are derived from the primary record and must never
//! carry a status the primary does not have.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lifecycle::AssignmentStatus;
use crate::model::registration::{ManagerRef, Priority, Registration, RegistrationKey, ServiceKind};

/// Searchable projection of one registration, keyed
/// `{clientId}_{registrationId}` under `registrations_index/`.
///
/// Mirrored fields must stay byte-for-byte equal to the primary record,
/// which is why plans always write both in the same fan-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatIndexRecord {
    pub client_id: String,
    pub registration_id: String,
    pub service: ServiceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_status: Option<AssignmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_manager: Option<ManagerRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_date: Option<DateTime<Utc>>,
}

impl FlatIndexRecord {
    /// Projects the searchable fields of a registration.
    pub fn project(key: &RegistrationKey, reg: &Registration) -> Self {
        Self {
            client_id: key.client_id.clone(),
            registration_id: key.registration_id.clone(),
            service: reg.service.clone(),
            assignment_status: reg.assignment_status,
            client_name: reg.client_name.clone(),
            assigned_manager: reg.assigned_manager.clone(),
            assigned_to: reg.assigned_to.clone(),
            priority: reg.priority,
            applied_date: reg.applied_date,
            assigned_date: reg.assigned_date,
        }
    }

    pub fn key(&self) -> RegistrationKey {
        RegistrationKey::new(self.client_id.clone(), self.registration_id.clone())
    }
}

/// Minimal projection stored under a manager or employee id so a
/// dashboard can resolve its registrations with one collection read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverseIndexEntry {
    pub client_id: String,
    pub registration_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub assignment_status: AssignmentStatus,
}

impl ReverseIndexEntry {
    /// Projects a reverse-index entry; the status is resolved (absence in
    /// the primary reads as `registered`).
    pub fn project(key: &RegistrationKey, reg: &Registration) -> Self {
        Self {
            client_id: key.client_id.clone(),
            registration_id: key.registration_id.clone(),
            display_name: reg.client_name.clone(),
            assignment_status: reg.status(),
        }
    }

    pub fn key(&self) -> RegistrationKey {
        RegistrationKey::new(self.client_id.clone(), self.registration_id.clone())
    }
}
