//! Settings document and its repository port.

use crate::user::domain::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Secret code an enrolling user must present to obtain the admin role.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminCode(String);

impl AdminCode {
    /// Creates an admin code, rejecting blank values.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::EmptyAdminCode`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, SettingsError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(SettingsError::EmptyAdminCode);
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Compares a presented code against this one.
    #[must_use]
    pub fn matches(&self, presented: &str) -> bool {
        self.0 == presented.trim()
    }
}

impl fmt::Debug for AdminCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminCode(***)")
    }
}

/// Organization-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationSettings {
    /// Organization display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Public contact phone.
    pub phone: Option<String>,
    /// Admin enrollment code.
    pub admin_code: AdminCode,
    /// Admin who last saved the settings.
    pub updated_by: Option<UserId>,
    /// Last save timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Repository contract for the singleton settings document.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Loads the settings, or `None` when never saved.
    async fn load(&self) -> Result<Option<OrganizationSettings>, SettingsError>;

    /// Replaces the settings document.
    async fn save(&self, settings: &OrganizationSettings) -> Result<(), SettingsError>;

    /// Stores `settings` only when no document exists yet, as one atomic
    /// step.
    ///
    /// Returns `false` and leaves the stored document untouched when one
    /// already exists.
    async fn insert_if_absent(
        &self,
        settings: &OrganizationSettings,
    ) -> Result<bool, SettingsError>;
}

/// Errors raised by settings validation and persistence.
#[derive(Debug, Clone, Error)]
pub enum SettingsError {
    /// The organization name is blank.
    #[error("organization name must not be empty")]
    EmptyName,

    /// The admin code is blank.
    #[error("admin enrollment code must not be empty")]
    EmptyAdminCode,

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl SettingsError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
