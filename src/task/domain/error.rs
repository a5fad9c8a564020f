//! Error types for task domain validation and transitions.

use super::{TaskId, TaskStatus};
use crate::user::domain::UserId;
use thiserror::Error;

/// Errors returned while constructing or transitioning tasks.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task type is not one of the supported kinds.
    #[error("unknown task type: {0}")]
    UnknownTaskKind(String),

    /// The urgency is not one of the supported levels.
    #[error("unknown urgency: {0}")]
    UnknownUrgency(String),

    /// A claim was attempted on a task that is no longer open.
    #[error("task {task_id} has already been claimed (status {status})")]
    AlreadyClaimed {
        /// Task identifier.
        task_id: TaskId,
        /// Status observed inside the claim transaction.
        status: TaskStatus,
    },

    /// The requested transition is not permitted from the current status.
    #[error("invalid transition for task {task_id}: {from} -> {to}")]
    InvalidTransition {
        /// Task identifier.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// Only the current claimant may complete a task.
    #[error("user {actor} is not the claimant of task {task_id}")]
    NotClaimant {
        /// Task identifier.
        task_id: TaskId,
        /// User who attempted the completion.
        actor: UserId,
    },

    /// A persisted document carries claim fields that contradict its status.
    #[error("task {task_id} has inconsistent claim fields for status {status}")]
    InconsistentClaim {
        /// Task identifier.
        task_id: TaskId,
        /// Persisted status.
        status: TaskStatus,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
