//! Store port for task persistence and atomic transitions.

use super::TaskQuery;
use crate::task::domain::{Task, TaskDomainError, TaskId};
use crate::user::domain::{CounterIncrement, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Read-modify-write step run inside a store transaction.
///
/// Receives the task as currently stored and returns the document to write
/// together with an optional counter increment. Returning an error aborts
/// the transaction with nothing written. Stores with optimistic concurrency
/// may call a fresh closure per attempt, so the step must not have side
/// effects outside its return value.
pub type TransitionFn =
    Box<dyn FnOnce(Task) -> Result<TransitionWrite, TaskDomainError> + Send + 'static>;

/// Writes produced by a transition step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionWrite {
    /// Task document to store.
    pub task: Task,
    /// Counter to increment in the same atomic unit.
    pub increment: Option<CounterIncrement>,
}

impl TransitionWrite {
    /// Writes the task only.
    #[must_use]
    pub const fn task(task: Task) -> Self {
        Self {
            task,
            increment: None,
        }
    }

    /// Writes the task and increments a counter.
    #[must_use]
    pub const fn with_increment(task: Task, increment: CounterIncrement) -> Self {
        Self {
            task,
            increment: Some(increment),
        }
    }
}

/// Transactional task persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Stores a new task and increments the creator's counter atomically.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] when the identifier exists
    /// and [`TaskStoreError::UnknownUser`] when the counter owner does not.
    async fn insert(&self, task: &Task, increment: CounterIncrement) -> TaskStoreResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>>;

    /// Runs `apply` as one atomic read-modify-write against the current task.
    ///
    /// Concurrent transitions on the same task are linearized: exactly one
    /// of two racing steps observes a given stored value and commits.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] for a missing task,
    /// [`TaskStoreError::Rejected`] when `apply` refuses the transition,
    /// [`TaskStoreError::UnknownUser`] when the counter owner is missing, and
    /// [`TaskStoreError::Contention`] when the store gave up on a conflicting
    /// commit. No write happens in any error case.
    async fn transition(&self, id: TaskId, apply: TransitionFn) -> TaskStoreResult<Task>;

    /// Evaluates a point-in-time query.
    async fn query(&self, query: &TaskQuery) -> TaskStoreResult<Vec<Task>>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The user whose counter should be incremented does not exist.
    #[error("user not found: {0}")]
    UnknownUser(UserId),

    /// The transition step rejected the stored state.
    #[error(transparent)]
    Rejected(#[from] TaskDomainError),

    /// The transaction lost a write conflict and was rolled back.
    #[error("transaction on task {0} lost a write conflict")]
    Contention(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
