//! Point-in-time task queries backing the live views.

use crate::task::domain::{Task, TaskStatus};
use crate::user::domain::UserId;
use std::cmp::Reverse;

/// Row limit for the admin "all tasks" view.
pub const ALL_TASKS_LIMIT: usize = 50;

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOrder {
    /// Newest tasks first.
    NewestCreated,
    /// Most recently claimed first.
    NewestClaimed,
}

/// Filter, order, and limit over the `tasks` collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    statuses: Vec<TaskStatus>,
    claimed_by: Option<UserId>,
    order: TaskOrder,
    limit: Option<usize>,
}

impl TaskQuery {
    /// Open tasks, newest first.
    #[must_use]
    pub fn open() -> Self {
        Self {
            statuses: vec![TaskStatus::Open],
            claimed_by: None,
            order: TaskOrder::NewestCreated,
            limit: None,
        }
    }

    /// Tasks claimed by `user_id`, most recently claimed first.
    #[must_use]
    pub const fn claimed_by(user_id: UserId) -> Self {
        Self {
            statuses: Vec::new(),
            claimed_by: Some(user_id),
            order: TaskOrder::NewestClaimed,
            limit: None,
        }
    }

    /// Every task, newest first, capped at [`ALL_TASKS_LIMIT`].
    #[must_use]
    pub const fn all() -> Self {
        Self {
            statuses: Vec::new(),
            claimed_by: None,
            order: TaskOrder::NewestCreated,
            limit: Some(ALL_TASKS_LIMIT),
        }
    }

    /// Overrides the row limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns the result ordering.
    #[must_use]
    pub const fn order(&self) -> TaskOrder {
        self.order
    }

    /// Returns the row limit, if any.
    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Whether `task` passes the filter.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        let status_matches = self.statuses.is_empty() || self.statuses.contains(&task.status());
        let claimant_matches = self.claimed_by.as_ref().is_none_or(|user_id| {
            task.claimant()
                .is_some_and(|claimant| claimant.id() == user_id)
        });
        status_matches && claimant_matches
    }

    /// Filters, orders, and limits `tasks` the way a store would.
    #[must_use]
    pub fn evaluate(&self, tasks: impl IntoIterator<Item = Task>) -> Vec<Task> {
        let mut selected: Vec<Task> = tasks.into_iter().filter(|task| self.matches(task)).collect();
        match self.order {
            TaskOrder::NewestCreated => {
                selected.sort_by_key(|task| Reverse(task.created_at()));
            }
            TaskOrder::NewestClaimed => {
                selected.sort_by_key(|task| Reverse(task.claim().map(|claim| claim.claimed_at())));
            }
        }
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}
