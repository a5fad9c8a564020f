//! Directory port over the `users` collection.

use crate::user::domain::{NotificationToken, Role, User, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for user directory operations.
pub type UserDirectoryResult<T> = Result<T, UserDirectoryError>;

/// User persistence and lookup contract.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Stores a new profile.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::DuplicateUser`] when a profile already
    /// exists for the identity.
    async fn create(&self, user: &User) -> UserDirectoryResult<()>;

    /// Finds a user by identity.
    ///
    /// Returns `None` when no profile exists.
    async fn find_by_id(&self, id: &UserId) -> UserDirectoryResult<Option<User>>;

    /// Returns every user with the given role.
    async fn list_by_role(&self, role: Role) -> UserDirectoryResult<Vec<User>>;

    /// Returns active volunteers holding a notification token, evaluated at
    /// a single point in time.
    async fn find_notifiable_volunteers(&self) -> UserDirectoryResult<Vec<User>>;

    /// Replaces a user's notification token, recording when it was issued.
    ///
    /// Only the token fields are written, so concurrent counter updates are
    /// never lost.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::NotFound`] when the user does not exist.
    async fn set_notification_token(
        &self,
        id: &UserId,
        token: NotificationToken,
        issued_at: DateTime<Utc>,
    ) -> UserDirectoryResult<()>;

    /// Removes a user's notification token.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::NotFound`] when the user does not exist.
    async fn clear_notification_token(&self, id: &UserId) -> UserDirectoryResult<()>;

    /// Clears a user's token only if it still equals `stale`.
    ///
    /// Returns `true` when a token was cleared. A missing user is not an
    /// error.
    async fn clear_token_if_matches(
        &self,
        id: &UserId,
        stale: &NotificationToken,
    ) -> UserDirectoryResult<bool>;
}

/// Errors returned by user directory implementations.
#[derive(Debug, Clone, Error)]
pub enum UserDirectoryError {
    /// A profile already exists for the identity.
    #[error("user profile already exists: {0}")]
    DuplicateUser(UserId),

    /// The user was not found.
    #[error("user not found: {0}")]
    NotFound(UserId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserDirectoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
