//! Session value and role policy checks.

use crate::user::domain::{Role, User, UserId};
use thiserror::Error;

/// Authenticated actor on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: UserId,
    display_name: String,
    role: Role,
    phone: Option<String>,
}

impl Session {
    /// Creates a session from explicit parts.
    #[must_use]
    pub fn new(user_id: UserId, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            role,
            phone: None,
        }
    }

    /// Sets the actor's contact phone.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Builds a session from a stored profile.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id().clone(),
            display_name: user.display_name().to_owned(),
            role: user.role(),
            phone: user.phone().map(str::to_owned),
        }
    }

    /// Returns the acting user's identity.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the acting user's display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the acting user's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the acting user's phone, if known.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Rejects the session unless it holds `required`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Unauthorized`] when the roles differ.
    pub fn require_role(&self, required: Role) -> Result<(), PolicyError> {
        if self.role == required {
            return Ok(());
        }
        Err(PolicyError::Unauthorized {
            user_id: self.user_id.clone(),
            required,
            actual: self.role,
        })
    }
}

/// Access-control rejections raised before an operation reaches the engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// The actor lacks the role the operation needs.
    #[error("user {user_id} has role {actual}, operation requires {required}")]
    Unauthorized {
        /// Acting user.
        user_id: UserId,
        /// Role the operation requires.
        required: Role,
        /// Role the actor holds.
        actual: Role,
    },
}
