//! Push transport port.

use crate::notification::domain::{NotificationData, NotificationMessage};
use crate::user::domain::NotificationToken;
use async_trait::async_trait;
use thiserror::Error;

/// Why the transport rejected a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// The token is malformed or was never valid.
    InvalidToken,
    /// The token was valid once but the device unregistered.
    Unregistered,
    /// Any other per-recipient failure.
    Other(String),
}

impl DeliveryFailure {
    /// Whether the token should be removed from the user record.
    #[must_use]
    pub const fn is_stale_token(&self) -> bool {
        matches!(self, Self::InvalidToken | Self::Unregistered)
    }
}

/// Result code for one token in a multicast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The transport accepted the message.
    Delivered,
    /// The transport rejected the token.
    Failed(DeliveryFailure),
}

impl DeliveryOutcome {
    /// Whether the message was accepted.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Whether the token should be removed from the user record.
    #[must_use]
    pub const fn is_stale_token(&self) -> bool {
        match self {
            Self::Delivered => false,
            Self::Failed(failure) => failure.is_stale_token(),
        }
    }
}

/// Whole-request failures reported by a push transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushTransportError {
    /// The transport could not be reached.
    #[error("push transport unreachable: {0}")]
    Unreachable(String),
    /// The transport rejected our credentials.
    #[error("push transport authentication failed: {0}")]
    Authentication(String),
    /// The single target token is invalid.
    #[error("notification token is invalid")]
    InvalidToken,
    /// The single target token is no longer registered.
    #[error("notification token is unregistered")]
    Unregistered,
    /// Any other transport failure.
    #[error("push transport error: {0}")]
    Transport(String),
}

impl PushTransportError {
    /// Whether the error identifies the target token as dead.
    #[must_use]
    pub const fn is_stale_token(&self) -> bool {
        matches!(self, Self::InvalidToken | Self::Unregistered)
    }
}

/// External push-delivery mechanism.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Sends one message to one token.
    ///
    /// # Errors
    ///
    /// Returns a [`PushTransportError`] when delivery fails.
    async fn send(
        &self,
        token: &NotificationToken,
        message: &NotificationMessage,
        data: &NotificationData,
    ) -> Result<(), PushTransportError>;

    /// Sends one message to many tokens.
    ///
    /// Returns one outcome per token, in token order.
    ///
    /// # Errors
    ///
    /// Returns a [`PushTransportError`] when the whole request fails.
    async fn send_multicast(
        &self,
        tokens: &[NotificationToken],
        message: &NotificationMessage,
        data: &NotificationData,
    ) -> Result<Vec<DeliveryOutcome>, PushTransportError>;
}
