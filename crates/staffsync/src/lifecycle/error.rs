//! Assignment state machine error types.

use thiserror::Error;

use super::status::AssignmentStatus;

/// Errors raised by transition planning, always before any store call.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AssignmentError {
    /// A manager or employee assignment was triggered without a selection.
    #[error("No {role} selected for assignment")]
    InvalidAssignment { role: &'static str },

    /// The trigger is not legal from the registration's current status.
    #[error("Transition '{trigger}' is not legal from status '{from}'")]
    IllegalTransition {
        trigger: &'static str,
        from: AssignmentStatus,
    },
}

/// Result type for transition planning.
pub type Result<T> = std::result::Result<T, AssignmentError>;
