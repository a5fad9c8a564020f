//! [`SettingsRepository`] implementation for [`InMemoryStore`].

use super::InMemoryStore;
use crate::organization::{OrganizationSettings, SettingsError, SettingsRepository};
use async_trait::async_trait;

#[async_trait]
impl SettingsRepository for InMemoryStore {
    async fn load(&self) -> Result<Option<OrganizationSettings>, SettingsError> {
        let state = self.read().map_err(SettingsError::persistence)?;
        Ok(state.settings.clone())
    }

    async fn save(&self, settings: &OrganizationSettings) -> Result<(), SettingsError> {
        let mut state = self.write().map_err(SettingsError::persistence)?;
        state.settings = Some(settings.clone());
        Ok(())
    }

    async fn insert_if_absent(
        &self,
        settings: &OrganizationSettings,
    ) -> Result<bool, SettingsError> {
        let mut state = self.write().map_err(SettingsError::persistence)?;
        if state.settings.is_some() {
            return Ok(false);
        }
        state.settings = Some(settings.clone());
        Ok(true)
    }
}
