//! Life-cycle status values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status of a registration's assignment life cycle.
///
/// Absence of the field in the store is equivalent to [`Registered`].
/// "Restored" is a UI filter label, not a status: restoring a rejected
/// registration re-enters the machine at [`PendingManager`].
///
/// [`Registered`]: AssignmentStatus::Registered
/// [`PendingManager`]: AssignmentStatus::PendingManager
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    #[default]
    Registered,
    PendingManager,
    PendingEmployee,
    PendingAcceptance,
    Active,
    Inactive,
    Rejected,
}

impl AssignmentStatus {
    /// Every status, in life-cycle order.
    pub const ALL: [Self; 7] = [
        Self::Registered,
        Self::PendingManager,
        Self::PendingEmployee,
        Self::PendingAcceptance,
        Self::Active,
        Self::Inactive,
        Self::Rejected,
    ];

    /// The wire form, as stored in `assignmentStatus` fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::PendingManager => "pending_manager",
            Self::PendingEmployee => "pending_employee",
            Self::PendingAcceptance => "pending_acceptance",
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_registered() {
        assert_eq!(AssignmentStatus::default(), AssignmentStatus::Registered);
    }

    #[test]
    fn test_serde_matches_wire_form() {
        for status in AssignmentStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            let back: AssignmentStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn test_unknown_status_fails_to_parse() {
        assert!(serde_json::from_str::<AssignmentStatus>("\"restored\"").is_err());
    }
}
