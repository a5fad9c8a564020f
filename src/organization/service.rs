//! Admin-facing settings service.

use super::{AdminCode, OrganizationSettings, SettingsError, SettingsRepository};
use crate::session::{PolicyError, Session};
use crate::user::domain::Role;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for saving organization settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSettingsRequest {
    name: String,
    description: Option<String>,
    phone: Option<String>,
    admin_code: String,
}

impl UpdateSettingsRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, admin_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            phone: None,
            admin_code: admin_code.into(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the public phone.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Service-level errors for settings operations.
#[derive(Debug, Error)]
pub enum OrganizationError {
    /// Caller is not an admin.
    #[error(transparent)]
    Unauthorized(#[from] PolicyError),
    /// Validation or persistence failed.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// Bootstrap was attempted after settings already exist.
    #[error("organization settings are already initialized")]
    AlreadyInitialized,
}

/// Reads and updates the settings document.
#[derive(Clone)]
pub struct OrganizationService<S, C>
where
    S: SettingsRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> OrganizationService<S, C>
where
    S: SettingsRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new settings service.
    #[must_use]
    pub const fn new(repository: Arc<S>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Returns the current settings.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizationError::Settings`] when loading fails.
    pub async fn settings(&self) -> Result<Option<OrganizationSettings>, OrganizationError> {
        Ok(self.repository.load().await?)
    }

    /// Saves new settings on behalf of an admin.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizationError::Unauthorized`] for non-admins and
    /// [`OrganizationError::Settings`] for blank fields or persistence
    /// failures.
    pub async fn update(
        &self,
        session: &Session,
        request: UpdateSettingsRequest,
    ) -> Result<OrganizationSettings, OrganizationError> {
        session.require_role(Role::Admin)?;
        let settings = self.build(request, Some(session))?;
        self.repository.save(&settings).await?;
        tracing::info!(updated_by = %session.user_id(), "organization settings saved");
        Ok(settings)
    }

    /// Writes the first settings document of a fresh deployment.
    ///
    /// Admin enrollment needs a code, and only admins may set one, so the
    /// initial document is written by the operator rather than a session.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizationError::AlreadyInitialized`] when settings exist
    /// and [`OrganizationError::Settings`] for blank fields or persistence
    /// failures.
    pub async fn bootstrap(
        &self,
        request: UpdateSettingsRequest,
    ) -> Result<OrganizationSettings, OrganizationError> {
        let settings = self.build(request, None)?;
        if !self.repository.insert_if_absent(&settings).await? {
            return Err(OrganizationError::AlreadyInitialized);
        }
        tracing::info!(name = %settings.name, "organization settings bootstrapped");
        Ok(settings)
    }

    fn build(
        &self,
        request: UpdateSettingsRequest,
        session: Option<&Session>,
    ) -> Result<OrganizationSettings, OrganizationError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(SettingsError::EmptyName.into());
        }
        Ok(OrganizationSettings {
            name: name.to_owned(),
            description: non_blank(request.description),
            phone: non_blank(request.phone),
            admin_code: AdminCode::new(request.admin_code)?,
            updated_by: session.map(|value| value.user_id().clone()),
            updated_at: self.clock.utc(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}
