//! Live task views refreshed from the store after each transition.

use super::TaskLifecycleResult;
use crate::task::{
    domain::{Task, TaskTransitionEvent},
    ports::{TaskQuery, TaskStore},
};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

/// A query kept current by re-reading the store whenever a transition is
/// committed.
///
/// Results always come from the store, never from event payloads, so a
/// feed reflects the authoritative document state after every transition.
pub struct TaskFeed<S>
where
    S: TaskStore,
{
    store: Arc<S>,
    query: TaskQuery,
    events: broadcast::Receiver<TaskTransitionEvent>,
}

impl<S> TaskFeed<S>
where
    S: TaskStore,
{
    /// Creates a feed over `query`, woken by `events`.
    #[must_use]
    pub const fn new(
        store: Arc<S>,
        query: TaskQuery,
        events: broadcast::Receiver<TaskTransitionEvent>,
    ) -> Self {
        Self {
            store,
            query,
            events,
        }
    }

    /// Returns the query this feed evaluates.
    #[must_use]
    pub const fn query(&self) -> &TaskQuery {
        &self.query
    }

    /// Evaluates the query now.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskLifecycleError::Store`] when the query fails.
    pub async fn snapshot(&self) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.store.query(&self.query).await?)
    }

    /// Waits for the next transition and returns the refreshed results.
    ///
    /// Returns `Ok(None)` once the event source has shut down. Missed events
    /// after a lag collapse into a single refresh.
    ///
    /// # Errors
    ///
    /// Returns [`super::TaskLifecycleError::Store`] when the query fails.
    pub async fn next_change(&mut self) -> TaskLifecycleResult<Option<Vec<Task>>> {
        match self.events.recv().await {
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "task feed lagged; refreshing once");
            }
            Err(RecvError::Closed) => return Ok(None),
        }
        self.snapshot().await.map(Some)
    }
}
