//! Application services for task lifecycle orchestration.

mod feed;
mod lifecycle;

pub use feed::TaskFeed;
pub use lifecycle::{
    CreateTaskRequest, DEFAULT_MAX_TRANSACTION_ATTEMPTS, TaskLifecycleError, TaskLifecycleResult,
    TaskLifecycleService,
};
