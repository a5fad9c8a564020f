//! Port contracts for the task lifecycle.
//!
//! Ports define infrastructure-agnostic interfaces used by task services:
//! the transactional task store, its point-in-time queries, and the
//! transition event seam listeners subscribe to.

pub mod events;
pub mod query;
pub mod store;

pub use events::{TransitionListener, TransitionSink};
pub use query::{ALL_TASKS_LIMIT, TaskOrder, TaskQuery};
pub use store::{TaskStore, TaskStoreError, TaskStoreResult, TransitionFn, TransitionWrite};

#[cfg(test)]
pub use store::MockTaskStore;
