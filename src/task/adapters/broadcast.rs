//! In-process fan-out of transition events over a `tokio` broadcast channel.

use crate::task::{
    domain::TaskTransitionEvent,
    ports::{TransitionListener, TransitionSink},
};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

/// Publishes transition events to any number of subscribers.
///
/// Slow subscribers that fall more than `capacity` events behind skip the
/// oldest events and are told how many they missed.
#[derive(Debug, Clone)]
pub struct BroadcastTransitionBus {
    sender: broadcast::Sender<TaskTransitionEvent>,
}

impl BroadcastTransitionBus {
    /// Creates a bus buffering up to `capacity` events per subscriber.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TaskTransitionEvent> {
        self.sender.subscribe()
    }

    /// Spawns a task feeding every subsequent event to `listener`.
    ///
    /// The task ends once every bus handle has been dropped.
    pub fn spawn_listener<L>(&self, listener: Arc<L>) -> JoinHandle<()>
    where
        L: TransitionListener + 'static,
    {
        let mut receiver = self.subscribe();
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => listener.on_transition(&event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "transition listener lagged behind the bus");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

impl TransitionSink for BroadcastTransitionBus {
    fn publish(&self, event: TaskTransitionEvent) {
        let kind = event.kind().as_str();
        let task_id = event.task_id();
        // `send` only fails when nobody is subscribed.
        if self.sender.send(event).is_err() {
            tracing::debug!(%task_id, kind, "no transition subscribers");
        }
    }
}
