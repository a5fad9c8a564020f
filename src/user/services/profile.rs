//! First-login profile creation and notification token management.

use crate::organization::{SettingsError, SettingsRepository};
use crate::session::{PolicyError, Session};
use crate::user::{
    domain::{NewUserProfile, NotificationToken, Role, User, UserDomainError, UserId},
    ports::{UserDirectory, UserDirectoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating a profile on first login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProfileRequest {
    display_name: String,
    role: Role,
    phone: Option<String>,
    admin_code: Option<String>,
}

impl CreateProfileRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(display_name: impl Into<String>, role: Role) -> Self {
        Self {
            display_name: display_name.into(),
            role,
            phone: None,
            admin_code: None,
        }
    }

    /// Sets the contact phone carried by the identity.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the admin enrollment code presented by the user.
    #[must_use]
    pub fn with_admin_code(mut self, code: impl Into<String>) -> Self {
        self.admin_code = Some(code.into());
        self
    }
}

/// Service-level errors for profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Profile validation failed.
    #[error(transparent)]
    Domain(#[from] UserDomainError),
    /// Directory operation failed.
    #[error(transparent)]
    Directory(#[from] UserDirectoryError),
    /// Settings lookup failed.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// The admin role was requested without a valid enrollment code.
    #[error("admin enrollment code is missing or incorrect")]
    InvalidAdminCode,
    /// The actor lacks the role the operation needs.
    #[error(transparent)]
    Unauthorized(#[from] PolicyError),
}

/// Profile orchestration service.
#[derive(Clone)]
pub struct ProfileService<U, S, C>
where
    U: UserDirectory,
    S: SettingsRepository,
    C: Clock + Send + Sync,
{
    directory: Arc<U>,
    settings: Arc<S>,
    clock: Arc<C>,
}

impl<U, S, C> ProfileService<U, S, C>
where
    U: UserDirectory,
    S: SettingsRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new profile service.
    #[must_use]
    pub const fn new(directory: Arc<U>, settings: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            directory,
            settings,
            clock,
        }
    }

    /// Creates the profile for a newly signed-in identity.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidAdminCode`] when the admin role is
    /// requested without the organization's code,
    /// [`ProfileError::Domain`] for a blank name, and
    /// [`ProfileError::Directory`] when the profile already exists.
    pub async fn create_profile(
        &self,
        identity: UserId,
        request: CreateProfileRequest,
    ) -> Result<User, ProfileError> {
        if request.role == Role::Admin {
            self.verify_admin_code(request.admin_code.as_deref()).await?;
        }

        let user = User::new(
            NewUserProfile {
                id: identity,
                display_name: request.display_name,
                role: request.role,
                phone: request.phone,
            },
            &*self.clock,
        )?;
        self.directory.create(&user).await?;
        tracing::info!(user_id = %user.id(), role = user.role().as_str(), "profile created");
        Ok(user)
    }

    /// Returns the stored profile for an identity.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Directory`] when the lookup fails.
    pub async fn profile(&self, user_id: &UserId) -> Result<Option<User>, ProfileError> {
        Ok(self.directory.find_by_id(user_id).await?)
    }

    /// Stores the token most recently issued by the push transport.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Directory`] when the profile is missing.
    pub async fn register_token(
        &self,
        session: &Session,
        token: NotificationToken,
    ) -> Result<(), ProfileError> {
        self.directory
            .set_notification_token(session.user_id(), token, self.clock.utc())
            .await?;
        tracing::debug!(user_id = %session.user_id(), "notification token registered");
        Ok(())
    }

    /// Clears the session's token so a signed-out device stops receiving
    /// notifications.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Directory`] when the profile is missing.
    pub async fn logout(&self, session: &Session) -> Result<(), ProfileError> {
        self.directory
            .clear_notification_token(session.user_id())
            .await?;
        tracing::debug!(user_id = %session.user_id(), "notification token cleared on logout");
        Ok(())
    }

    /// Lists volunteers for the admin overview.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Unauthorized`] for non-admins and
    /// [`ProfileError::Directory`] when the lookup fails.
    pub async fn volunteers(&self, session: &Session) -> Result<Vec<User>, ProfileError> {
        session.require_role(Role::Admin)?;
        Ok(self.directory.list_by_role(Role::Volunteer).await?)
    }

    async fn verify_admin_code(&self, presented: Option<&str>) -> Result<(), ProfileError> {
        let settings = self.settings.load().await?;
        let accepted = settings
            .zip(presented)
            .is_some_and(|(value, code)| value.admin_code.matches(code));
        if accepted {
            Ok(())
        } else {
            Err(ProfileError::InvalidAdminCode)
        }
    }
}
