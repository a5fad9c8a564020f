//! Transition events emitted after each committed lifecycle operation.

use super::{Task, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Which lifecycle transition was committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// A task was posted.
    Created,
    /// A volunteer claimed the task.
    Taken,
    /// The claimant completed the task.
    Completed,
    /// An admin cancelled the open task.
    Cancelled,
}

impl TransitionKind {
    /// Returns the event name carried in notification payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "task_created",
            Self::Taken => "task_taken",
            Self::Completed => "task_completed",
            Self::Cancelled => "task_cancelled",
        }
    }
}

/// A committed transition and the task snapshot it produced.
///
/// Listeners must treat the live store document as authoritative; the
/// snapshot only reflects the task at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTransitionEvent {
    kind: TransitionKind,
    task: Task,
    occurred_at: DateTime<Utc>,
}

impl TaskTransitionEvent {
    /// Creates an event stamped with the clock's current time.
    #[must_use]
    pub fn new(kind: TransitionKind, task: Task, clock: &impl Clock) -> Self {
        Self {
            kind,
            task,
            occurred_at: clock.utc(),
        }
    }

    /// Returns the transition kind.
    #[must_use]
    pub const fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task.id()
    }

    /// Returns the task snapshot at commit time.
    #[must_use]
    pub const fn task(&self) -> &Task {
        &self.task
    }

    /// Returns when the transition was committed.
    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
