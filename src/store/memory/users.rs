//! [`UserDirectory`] implementation for [`InMemoryStore`].

use super::InMemoryStore;
use crate::user::{
    domain::{NotificationToken, Role, User, UserId},
    ports::{UserDirectory, UserDirectoryError, UserDirectoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn create(&self, user: &User) -> UserDirectoryResult<()> {
        let mut state = self.write().map_err(UserDirectoryError::persistence)?;
        if state.users.contains_key(user.id()) {
            return Err(UserDirectoryError::DuplicateUser(user.id().clone()));
        }
        state.users.insert(user.id().clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> UserDirectoryResult<Option<User>> {
        let state = self.read().map_err(UserDirectoryError::persistence)?;
        Ok(state.users.get(id).cloned())
    }

    async fn list_by_role(&self, role: Role) -> UserDirectoryResult<Vec<User>> {
        let state = self.read().map_err(UserDirectoryError::persistence)?;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|user| user.role() == role)
            .cloned()
            .collect();
        users.sort_by(|left, right| left.display_name().cmp(right.display_name()));
        Ok(users)
    }

    async fn find_notifiable_volunteers(&self) -> UserDirectoryResult<Vec<User>> {
        let state = self.read().map_err(UserDirectoryError::persistence)?;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|user| user.is_notifiable_volunteer())
            .cloned()
            .collect();
        users.sort_by(|left, right| left.id().cmp(right.id()));
        Ok(users)
    }

    async fn set_notification_token(
        &self,
        id: &UserId,
        token: NotificationToken,
        issued_at: DateTime<Utc>,
    ) -> UserDirectoryResult<()> {
        let mut state = self.write().map_err(UserDirectoryError::persistence)?;
        let user = state
            .users
            .get_mut(id)
            .ok_or_else(|| UserDirectoryError::NotFound(id.clone()))?;
        user.set_notification_token(token, issued_at);
        Ok(())
    }

    async fn clear_notification_token(&self, id: &UserId) -> UserDirectoryResult<()> {
        let mut state = self.write().map_err(UserDirectoryError::persistence)?;
        let user = state
            .users
            .get_mut(id)
            .ok_or_else(|| UserDirectoryError::NotFound(id.clone()))?;
        user.clear_notification_token();
        Ok(())
    }

    async fn clear_token_if_matches(
        &self,
        id: &UserId,
        stale: &NotificationToken,
    ) -> UserDirectoryResult<bool> {
        let mut state = self.write().map_err(UserDirectoryError::persistence)?;
        Ok(state
            .users
            .get_mut(id)
            .is_some_and(|user| user.clear_notification_token_if(stale)))
    }
}
