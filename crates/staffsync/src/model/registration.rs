//! Registration records — one enrollment of a client into one service.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lifecycle::AssignmentStatus;

/// Identifies a registration by the `(clientId, registrationId)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistrationKey {
    pub client_id: String,
    pub registration_id: String,
}

impl RegistrationKey {
    pub fn new(client_id: impl Into<String>, registration_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            registration_id: registration_id.into(),
        }
    }

    /// Flat/reverse index key: `{clientId}_{registrationId}`.
    pub fn index_key(&self) -> String {
        format!("{}_{}", self.client_id, self.registration_id)
    }

    /// Parses an index key back into its parts. Client ids never contain
    /// an underscore, so the first one is the separator.
    pub fn from_index_key(key: &str) -> Option<Self> {
        let (client_id, registration_id) = key.split_once('_')?;
        if client_id.is_empty() || registration_id.is_empty() {
            return None;
        }
        Some(Self::new(client_id, registration_id))
    }
}

impl fmt::Display for RegistrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.client_id, self.registration_id)
    }
}

/// Services the agency offers for enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    JobPlacement,
    ResumeReview,
    VisaSupport,
    SkillsTraining,
    /// Services added remotely that this build does not know about.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
}

/// Manager assigned to a registration: id plus the display name shown in
/// listings, denormalized so index rows render without a profile read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerRef {
    pub id: String,
    pub display_name: String,
}

impl ManagerRef {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// One enrollment of a client into one service.
///
/// Stored at `records/{clientId}/registrations/{registrationId}`. The
/// `assignmentStatus` field may be absent in the store; absence reads as
/// [`AssignmentStatus::Registered`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub service: ServiceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_status: Option<AssignmentStatus>,
    /// Client display name, denormalized onto the registration at enrollment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_manager: Option<ManagerRef>,
    /// Employee (recruiter) id, set in the manager-facing flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visa_status: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resumes: Vec<String>,
    /// Blob-store reference to the cover letter, if uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
}

impl Registration {
    /// Creates a registration in the initial state.
    pub fn new(service: ServiceKind) -> Self {
        Self {
            service,
            assignment_status: None,
            client_name: None,
            assigned_manager: None,
            assigned_to: None,
            priority: None,
            applied_date: None,
            assigned_date: None,
            education: None,
            employment: None,
            visa_status: None,
            resumes: Vec::new(),
            cover_letter: None,
        }
    }

    /// Effective status; an absent field is the initial state.
    pub fn status(&self) -> AssignmentStatus {
        self.assignment_status.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_key_roundtrip() {
        let key = RegistrationKey::new("c1", "r1");
        assert_eq!(key.index_key(), "c1_r1");
        assert_eq!(RegistrationKey::from_index_key("c1_r1"), Some(key));
    }

    #[test]
    fn test_index_key_registration_id_may_contain_underscore() {
        let key = RegistrationKey::from_index_key("c1_r_2").unwrap();
        assert_eq!(key.client_id, "c1");
        assert_eq!(key.registration_id, "r_2");
    }

    #[test]
    fn test_from_index_key_rejects_malformed() {
        assert!(RegistrationKey::from_index_key("noseparator").is_none());
        assert!(RegistrationKey::from_index_key("_r1").is_none());
        assert!(RegistrationKey::from_index_key("c1_").is_none());
    }

    #[test]
    fn test_absent_status_reads_as_registered() {
        let json = r#"{ "service": "job_placement" }"#;
        let reg: Registration = serde_json::from_str(json).unwrap();
        assert_eq!(reg.assignment_status, None);
        assert_eq!(reg.status(), AssignmentStatus::Registered);
    }

    #[test]
    fn test_unknown_service_deserializes_as_other() {
        let json = r#"{ "service": "career_coaching" }"#;
        let reg: Registration = serde_json::from_str(json).unwrap();
        assert_eq!(reg.service, ServiceKind::Other);
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut reg = Registration::new(ServiceKind::VisaSupport);
        reg.assignment_status = Some(AssignmentStatus::PendingManager);
        reg.assigned_manager = Some(ManagerRef::new("m1", "Priya Shah"));
        let value = serde_json::to_value(&reg).unwrap();
        assert_eq!(value["assignmentStatus"], "pending_manager");
        assert_eq!(value["assignedManager"]["displayName"], "Priya Shah");
        assert!(value.get("assignedTo").is_none());
    }
}
