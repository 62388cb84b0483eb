//! Transition planning.

use chrono::{DateTime, Utc};

use crate::model::registration::{ManagerRef, Registration};

use super::error::{AssignmentError, Result};
use super::status::AssignmentStatus;

/// Trigger for one life-cycle transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Screening accepted the registration.
    Accept,
    /// Screening acceptance withdrawn.
    Unaccept,
    /// Registration declined.
    Decline,
    /// A rejected registration re-enters the pipeline.
    Restore,
    /// A manager was selected and saved.
    AssignManager(ManagerRef),
    /// An employee (recruiter) was selected in the manager-facing flow.
    AssignEmployee(String),
    /// The assigned employee accepted the assignment.
    ConfirmAssignment,
    /// Flip between active and inactive.
    ToggleActivation,
}

impl Transition {
    /// Stable trigger name used in errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Unaccept => "unaccept",
            Self::Decline => "decline",
            Self::Restore => "restore",
            Self::AssignManager(_) => "assign_manager",
            Self::AssignEmployee(_) => "assign_employee",
            Self::ConfirmAssignment => "confirm_assignment",
            Self::ToggleActivation => "toggle_activation",
        }
    }
}

/// Change to one optional field, produced by a transition.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldChange<T> {
    #[default]
    Keep,
    Set(T),
    Clear,
}

impl<T> FieldChange<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

/// Field-level delta produced by one transition.
///
/// The target status is always concrete; applying a delta can never leave
/// `assignmentStatus` unset.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusDelta {
    pub status: AssignmentStatus,
    pub manager: FieldChange<ManagerRef>,
    pub assigned_to: FieldChange<String>,
    pub assigned_date: FieldChange<DateTime<Utc>>,
}

impl StatusDelta {
    fn status_only(status: AssignmentStatus) -> Self {
        Self {
            status,
            manager: FieldChange::Keep,
            assigned_to: FieldChange::Keep,
            assigned_date: FieldChange::Keep,
        }
    }

    /// Applies the delta to a registration, as a full replacement of the
    /// status plus the fields the trigger changed.
    pub fn apply_to(&self, reg: &mut Registration) {
        reg.assignment_status = Some(self.status);
        match &self.manager {
            FieldChange::Keep => {}
            FieldChange::Set(m) => reg.assigned_manager = Some(m.clone()),
            FieldChange::Clear => reg.assigned_manager = None,
        }
        match &self.assigned_to {
            FieldChange::Keep => {}
            FieldChange::Set(e) => reg.assigned_to = Some(e.clone()),
            FieldChange::Clear => reg.assigned_to = None,
        }
        match &self.assigned_date {
            FieldChange::Keep => {}
            FieldChange::Set(d) => reg.assigned_date = Some(*d),
            FieldChange::Clear => reg.assigned_date = None,
        }
    }
}

/// Plans one transition from the current status.
///
/// Pure: guards are checked here and a guard failure means the store is
/// never touched. Re-applying a trigger from its own target status yields
/// the same delta, so repeated saves are idempotent. `now` stamps
/// `assignedDate` on manager assignment.
pub fn plan_transition(
    current: AssignmentStatus,
    transition: &Transition,
    now: DateTime<Utc>,
) -> Result<StatusDelta> {
    use AssignmentStatus::*;

    let illegal = || AssignmentError::IllegalTransition {
        trigger: transition.name(),
        from: current,
    };

    match transition {
        Transition::Accept => match current {
            Registered | PendingManager => Ok(StatusDelta::status_only(PendingManager)),
            _ => Err(illegal()),
        },

        Transition::Unaccept => match current {
            PendingManager | Registered => Ok(StatusDelta::status_only(Registered)),
            _ => Err(illegal()),
        },

        // Legal from every status; declining twice is a no-op.
        Transition::Decline => Ok(StatusDelta::status_only(Rejected)),

        Transition::Restore => match current {
            Rejected | PendingManager => Ok(StatusDelta {
                status: PendingManager,
                manager: FieldChange::Clear,
                assigned_to: FieldChange::Clear,
                assigned_date: FieldChange::Clear,
            }),
            _ => Err(illegal()),
        },

        Transition::AssignManager(manager) => {
            if manager.id.trim().is_empty() {
                return Err(AssignmentError::InvalidAssignment { role: "manager" });
            }
            match current {
                PendingManager | PendingEmployee | PendingAcceptance => Ok(StatusDelta {
                    status: PendingEmployee,
                    manager: FieldChange::Set(manager.clone()),
                    // A manager change restarts employee selection.
                    assigned_to: FieldChange::Clear,
                    assigned_date: FieldChange::Set(now),
                }),
                _ => Err(illegal()),
            }
        }

        Transition::AssignEmployee(employee_id) => {
            if employee_id.trim().is_empty() {
                return Err(AssignmentError::InvalidAssignment { role: "employee" });
            }
            match current {
                PendingEmployee | PendingAcceptance => Ok(StatusDelta {
                    status: PendingAcceptance,
                    manager: FieldChange::Keep,
                    assigned_to: FieldChange::Set(employee_id.clone()),
                    assigned_date: FieldChange::Keep,
                }),
                _ => Err(illegal()),
            }
        }

        Transition::ConfirmAssignment => match current {
            PendingAcceptance | Active => Ok(StatusDelta::status_only(Active)),
            _ => Err(illegal()),
        },

        Transition::ToggleActivation => match current {
            Active => Ok(StatusDelta::status_only(Inactive)),
            Inactive => Ok(StatusDelta::status_only(Active)),
            _ => Err(illegal()),
        },
    }
}
