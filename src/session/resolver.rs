//! Resolution of the signed-in identity into a session.

use super::{IdentityProvider, Session};
use crate::user::{
    domain::UserId,
    ports::{UserDirectory, UserDirectoryError},
};
use std::sync::Arc;
use thiserror::Error;

/// Outcome of resolving the current identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Nobody is signed in.
    SignedOut,
    /// Signed in for the first time; a profile must be created.
    NeedsProfile(UserId),
    /// Signed in with an existing profile.
    Active(Session),
}

/// Errors raised while resolving a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Profile lookup failed.
    #[error(transparent)]
    Directory(#[from] UserDirectoryError),
}

/// Builds sessions from the identity provider and the user directory.
#[derive(Clone)]
pub struct SessionResolver<I, U>
where
    I: IdentityProvider,
    U: UserDirectory,
{
    identity: Arc<I>,
    directory: Arc<U>,
}

impl<I, U> SessionResolver<I, U>
where
    I: IdentityProvider,
    U: UserDirectory,
{
    /// Creates a new resolver.
    #[must_use]
    pub const fn new(identity: Arc<I>, directory: Arc<U>) -> Self {
        Self {
            identity,
            directory,
        }
    }

    /// Resolves the currently signed-in identity.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Directory`] when the profile lookup fails.
    pub async fn current(&self) -> Result<SessionState, SessionError> {
        let Some(user_id) = self.identity.current_identity() else {
            return Ok(SessionState::SignedOut);
        };
        let state = match self.directory.find_by_id(&user_id).await? {
            Some(user) => SessionState::Active(Session::from_user(&user)),
            None => SessionState::NeedsProfile(user_id),
        };
        Ok(state)
    }
}
