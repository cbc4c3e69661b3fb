//! Error types for marketplace domain validation and state transitions.

use super::{ApplicationId, ApplicationStatus, TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or editing domain values.
///
/// Validation failures are the caller's fault and are never retried
/// automatically.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task description is empty after trimming.
    #[error("task description must not be empty")]
    EmptyDescription,

    /// The task location is empty after trimming.
    #[error("task location must not be empty")]
    EmptyLocation,

    /// The creator display name is empty after trimming.
    #[error("creator name must not be empty")]
    EmptyCreatorName,

    /// The reward must be strictly positive.
    #[error("reward must be positive, got {0}")]
    NonPositiveReward(i64),

    /// The deadline must lie in the future at creation time.
    #[error("deadline must be in the future")]
    DeadlineNotInFuture,

    /// The applicant display name is empty after trimming.
    #[error("applicant name must not be empty")]
    EmptyApplicantName,

    /// The applicant contact email is empty after trimming.
    #[error("applicant email must not be empty")]
    EmptyApplicantEmail,

    /// The application proposal is empty after trimming.
    #[error("proposal must not be empty")]
    EmptyProposal,

    /// The rating score is outside the accepted 1 to 5 range.
    #[error("rating {0} out of range, expected 1 to 5")]
    RatingOutOfRange(u8),

    /// The chat message body is empty after trimming.
    #[error("message body must not be empty")]
    EmptyMessageBody,
}

/// Errors returned when a lifecycle state machine rejects a transition.
///
/// Terminal-state violations land here; they are never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The task state machine forbids the requested transition.
    #[error("task {task_id} cannot transition from {from:?} to {to:?}")]
    InvalidTaskTransition {
        /// Task whose transition was rejected.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// The application state machine forbids the requested transition.
    #[error("application {application_id} cannot transition from {from:?} to {to:?}")]
    InvalidApplicationTransition {
        /// Application whose transition was rejected.
        application_id: ApplicationId,
        /// Current status.
        from: ApplicationStatus,
        /// Requested status.
        to: ApplicationStatus,
    },

    /// The task is not editable in its current status.
    #[error("task {task_id} is {status:?} and can no longer be edited")]
    TaskNotEditable {
        /// Task whose edit was rejected.
        task_id: TaskId,
        /// Current status.
        status: TaskStatus,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing application statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown application status: {0}")]
pub struct ParseApplicationStatusError(pub String);

/// Error returned while parsing task kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task kind: {0}")]
pub struct ParseTaskKindError(pub String);
