//! Port over the external authentication provider.

use crate::user::domain::UserId;
use tokio::sync::watch;

/// Source of the currently authenticated identity.
///
/// Sign-in flows (phone OTP, email, OAuth) live entirely behind this port;
/// the core only sees the opaque identity they produce.
pub trait IdentityProvider: Send + Sync {
    /// Returns the signed-in identity, or `None` when signed out.
    fn current_identity(&self) -> Option<UserId>;

    /// Subscribes to identity changes.
    fn watch(&self) -> watch::Receiver<Option<UserId>>;
}

/// Identity provider driven explicitly by the host application.
#[derive(Debug)]
pub struct StaticIdentityProvider {
    sender: watch::Sender<Option<UserId>>,
}

impl StaticIdentityProvider {
    /// Creates a signed-out provider.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(None);
        Self { sender }
    }

    /// Marks `user_id` as signed in and notifies watchers.
    pub fn sign_in(&self, user_id: UserId) {
        self.sender.send_replace(Some(user_id));
    }

    /// Signs out and notifies watchers.
    pub fn sign_out(&self) {
        self.sender.send_replace(None);
    }
}

impl Default for StaticIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn current_identity(&self) -> Option<UserId> {
        self.sender.borrow().clone()
    }

    fn watch(&self) -> watch::Receiver<Option<UserId>> {
        self.sender.subscribe()
    }
}
