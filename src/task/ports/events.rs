//! Transition event seam between the engine and its listeners.

use crate::task::domain::TaskTransitionEvent;
use async_trait::async_trait;

/// Receives every committed transition from the lifecycle engine.
///
/// Publishing is fire-and-forget: it must not block on listeners and must
/// not fail the lifecycle operation that produced the event.
pub trait TransitionSink: Send + Sync {
    /// Publishes a committed transition.
    fn publish(&self, event: TaskTransitionEvent);
}

/// Reacts to committed transitions.
#[async_trait]
pub trait TransitionListener: Send + Sync {
    /// Handles one event. Failures are the listener's own concern.
    async fn on_transition(&self, event: &TaskTransitionEvent);
}
