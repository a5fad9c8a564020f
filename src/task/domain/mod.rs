//! Domain model for the task lifecycle.
//!
//! A task moves `open → taken → completed`, or `open → cancelled`. The
//! aggregate enforces those transitions and the claimant invariant; the
//! store boundary rebuilds tasks through [`Task::from_persisted`], which
//! rejects documents that violate it.

mod error;
mod event;
mod ids;
mod kind;
mod task;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use event::{TaskTransitionEvent, TransitionKind};
pub use ids::TaskId;
pub use kind::{TaskKind, Urgency};
pub use task::{Claim, NewTask, Participant, PersistedTaskData, Task, TaskRoute, TaskStatus};
