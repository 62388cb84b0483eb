//! Store path conventions.
//!
//! All paths the core touches are built here so the layout lives in one
//! place:
//!
//! - `records/{clientId}` — client profile
//! - `records/{clientId}/registrations/{registrationId}` — registration
//! - `registrations_index/{clientId}_{registrationId}` — flat index
//! - `manager_index/{managerId}/{clientId}_{registrationId}`
//! - `employee_index/{employeeId}/{clientId}_{registrationId}`
//! - `applications/{clientId}/{registrationId}` — application collection

use std::fmt;

use crate::model::registration::RegistrationKey;

pub const RECORDS_ROOT: &str = "records";
pub const FLAT_INDEX_ROOT: &str = "registrations_index";
pub const MANAGER_INDEX_ROOT: &str = "manager_index";
pub const EMPLOYEE_INDEX_ROOT: &str = "employee_index";
pub const APPLICATIONS_ROOT: &str = "applications";

/// A slash-separated path into the hierarchical store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorePath(String);

impl StorePath {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends one path segment.
    pub fn child(&self, segment: &str) -> Self {
        Self(format!("{}/{}", self.0, segment))
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `records` — every client profile with its registrations subtree.
pub fn records_root() -> StorePath {
    StorePath::new(RECORDS_ROOT)
}

/// `records/{clientId}`
pub fn client(client_id: &str) -> StorePath {
    StorePath::new(format!("{}/{}", RECORDS_ROOT, client_id))
}

/// `records/{clientId}/registrations/{registrationId}`
pub fn registration(key: &RegistrationKey) -> StorePath {
    StorePath::new(format!(
        "{}/{}/registrations/{}",
        RECORDS_ROOT, key.client_id, key.registration_id
    ))
}

/// One field under the primary registration record.
pub fn registration_field(key: &RegistrationKey, field: &str) -> StorePath {
    registration(key).child(field)
}

/// `registrations_index`
pub fn flat_index_root() -> StorePath {
    StorePath::new(FLAT_INDEX_ROOT)
}

/// `registrations_index/{clientId}_{registrationId}`
pub fn flat_index(key: &RegistrationKey) -> StorePath {
    StorePath::new(format!("{}/{}", FLAT_INDEX_ROOT, key.index_key()))
}

/// One field under the flat index record.
pub fn flat_index_field(key: &RegistrationKey, field: &str) -> StorePath {
    flat_index(key).child(field)
}

/// `manager_index/{managerId}` — the manager's whole reverse index.
pub fn manager_index(manager_id: &str) -> StorePath {
    StorePath::new(format!("{}/{}", MANAGER_INDEX_ROOT, manager_id))
}

/// `manager_index/{managerId}/{clientId}_{registrationId}`
pub fn manager_index_entry(manager_id: &str, key: &RegistrationKey) -> StorePath {
    manager_index(manager_id).child(&key.index_key())
}

/// `employee_index/{employeeId}` — the employee's whole reverse index.
pub fn employee_index(employee_id: &str) -> StorePath {
    StorePath::new(format!("{}/{}", EMPLOYEE_INDEX_ROOT, employee_id))
}

/// `employee_index/{employeeId}/{clientId}_{registrationId}`
pub fn employee_index_entry(employee_id: &str, key: &RegistrationKey) -> StorePath {
    employee_index(employee_id).child(&key.index_key())
}

/// `applications/{clientId}/{registrationId}`
pub fn applications(key: &RegistrationKey) -> StorePath {
    StorePath::new(format!(
        "{}/{}/{}",
        APPLICATIONS_ROOT, key.client_id, key.registration_id
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> RegistrationKey {
        RegistrationKey::new("c1", "r1")
    }

    #[test]
    fn test_path_conventions() {
        assert_eq!(client("c1").as_str(), "records/c1");
        assert_eq!(registration(&key()).as_str(), "records/c1/registrations/r1");
        assert_eq!(flat_index(&key()).as_str(), "registrations_index/c1_r1");
        assert_eq!(
            manager_index_entry("m1", &key()).as_str(),
            "manager_index/m1/c1_r1"
        );
        assert_eq!(
            employee_index_entry("e1", &key()).as_str(),
            "employee_index/e1/c1_r1"
        );
        assert_eq!(applications(&key()).as_str(), "applications/c1/r1");
    }

    #[test]
    fn test_field_paths() {
        assert_eq!(
            registration_field(&key(), "assignmentStatus").as_str(),
            "records/c1/registrations/r1/assignmentStatus"
        );
        assert_eq!(
            flat_index_field(&key(), "assignedTo").as_str(),
            "registrations_index/c1_r1/assignedTo"
        );
    }

    #[test]
    fn test_segments() {
        let path = registration(&key());
        let segments: Vec<&str> = path.segments().collect();
        assert_eq!(segments, vec!["records", "c1", "registrations", "r1"]);
    }
}
