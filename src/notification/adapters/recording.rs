//! In-memory push transport that records deliveries.

use crate::notification::domain::{NotificationData, NotificationMessage};
use crate::notification::ports::{
    DeliveryFailure, DeliveryOutcome, PushTransport, PushTransportError,
};
use crate::user::domain::NotificationToken;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One message accepted by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    /// Token the message was delivered to.
    pub token: NotificationToken,
    /// Delivered message.
    pub message: NotificationMessage,
    /// Delivered payload.
    pub data: NotificationData,
}

#[derive(Debug, Default)]
struct TransportState {
    sent: Vec<SentNotification>,
    stale: HashSet<NotificationToken>,
    outage: bool,
}

/// Push transport backed by process memory.
///
/// Tokens marked stale are rejected as unregistered; an outage fails every
/// request as unreachable.
#[derive(Debug, Clone, Default)]
pub struct RecordingPushTransport {
    state: Arc<Mutex<TransportState>>,
}

impl RecordingPushTransport {
    /// Creates an empty transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the transport reject `token` from now on.
    ///
    /// # Errors
    ///
    /// Returns [`PushTransportError::Transport`] when the state lock is
    /// poisoned.
    pub fn mark_stale(&self, token: NotificationToken) -> Result<(), PushTransportError> {
        self.lock()?.stale.insert(token);
        Ok(())
    }

    /// Toggles a full transport outage.
    ///
    /// # Errors
    ///
    /// Returns [`PushTransportError::Transport`] when the state lock is
    /// poisoned.
    pub fn set_outage(&self, outage: bool) -> Result<(), PushTransportError> {
        self.lock()?.outage = outage;
        Ok(())
    }

    /// Returns every accepted message in delivery order.
    ///
    /// # Errors
    ///
    /// Returns [`PushTransportError::Transport`] when the state lock is
    /// poisoned.
    pub fn sent(&self) -> Result<Vec<SentNotification>, PushTransportError> {
        Ok(self.lock()?.sent.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, TransportState>, PushTransportError> {
        self.state.lock().map_err(poisoned)
    }
}

fn poisoned<T>(err: PoisonError<T>) -> PushTransportError {
    PushTransportError::Transport(err.to_string())
}

fn deliver(
    state: &mut TransportState,
    token: &NotificationToken,
    message: &NotificationMessage,
    data: &NotificationData,
) -> DeliveryOutcome {
    if state.stale.contains(token) {
        return DeliveryOutcome::Failed(DeliveryFailure::Unregistered);
    }
    state.sent.push(SentNotification {
        token: token.clone(),
        message: message.clone(),
        data: data.clone(),
    });
    DeliveryOutcome::Delivered
}

#[async_trait]
impl PushTransport for RecordingPushTransport {
    async fn send(
        &self,
        token: &NotificationToken,
        message: &NotificationMessage,
        data: &NotificationData,
    ) -> Result<(), PushTransportError> {
        let mut state = self.lock()?;
        if state.outage {
            return Err(PushTransportError::Unreachable("simulated outage".to_owned()));
        }
        match deliver(&mut state, token, message, data) {
            DeliveryOutcome::Delivered => Ok(()),
            DeliveryOutcome::Failed(_) => Err(PushTransportError::Unregistered),
        }
    }

    async fn send_multicast(
        &self,
        tokens: &[NotificationToken],
        message: &NotificationMessage,
        data: &NotificationData,
    ) -> Result<Vec<DeliveryOutcome>, PushTransportError> {
        let mut state = self.lock()?;
        if state.outage {
            return Err(PushTransportError::Unreachable("simulated outage".to_owned()));
        }
        Ok(tokens
            .iter()
            .map(|token| deliver(&mut state, token, message, data))
            .collect())
    }
}
