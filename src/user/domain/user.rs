//! User aggregate, roles, and task counters.

use super::{NotificationToken, ParseRoleError, UserDomainError, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role, fixed at profile creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Posts and cancels help requests.
    Admin,
    /// Claims and completes help requests.
    Volunteer,
}

impl Role {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Volunteer => "volunteer",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "volunteer" => Ok(Self::Volunteer),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names one of the per-user task counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCounter {
    /// Tasks posted by an admin.
    Created,
    /// Tasks claimed by a volunteer.
    Taken,
    /// Tasks completed by a volunteer.
    Completed,
}

/// Monotonically non-decreasing activity counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounters {
    tasks_created: u64,
    tasks_taken: u64,
    tasks_completed: u64,
}

impl TaskCounters {
    /// Rebuilds counters from persisted values.
    #[must_use]
    pub const fn from_parts(tasks_created: u64, tasks_taken: u64, tasks_completed: u64) -> Self {
        Self {
            tasks_created,
            tasks_taken,
            tasks_completed,
        }
    }

    /// Number of tasks created.
    #[must_use]
    pub const fn tasks_created(&self) -> u64 {
        self.tasks_created
    }

    /// Number of tasks claimed.
    #[must_use]
    pub const fn tasks_taken(&self) -> u64 {
        self.tasks_taken
    }

    /// Number of tasks completed.
    #[must_use]
    pub const fn tasks_completed(&self) -> u64 {
        self.tasks_completed
    }

    /// Increments a single counter by one.
    pub const fn increment(&mut self, counter: TaskCounter) {
        let slot = match counter {
            TaskCounter::Created => &mut self.tasks_created,
            TaskCounter::Taken => &mut self.tasks_taken,
            TaskCounter::Completed => &mut self.tasks_completed,
        };
        *slot = slot.saturating_add(1);
    }
}

/// Counter update committed alongside a task write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterIncrement {
    /// User whose counter is incremented.
    pub user_id: UserId,
    /// Counter to increment.
    pub counter: TaskCounter,
}

impl CounterIncrement {
    /// Creates a counter increment for a user.
    #[must_use]
    pub const fn new(user_id: UserId, counter: TaskCounter) -> Self {
        Self { user_id, counter }
    }
}

/// Validated input for a first-login profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserProfile {
    /// Identity issued by the auth provider.
    pub id: UserId,
    /// Display name shown on tasks and notifications.
    pub display_name: String,
    /// Account role.
    pub role: Role,
    /// Contact phone, if the identity carries one.
    pub phone: Option<String>,
}

/// User aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PersistedUserData")]
pub struct User {
    id: UserId,
    display_name: String,
    role: Role,
    phone: Option<String>,
    counters: TaskCounters,
    active: bool,
    notification_token: Option<NotificationToken>,
    token_updated_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersistedUserData {
    /// Persisted identity.
    pub id: UserId,
    /// Persisted display name.
    pub display_name: String,
    /// Persisted role.
    pub role: Role,
    /// Persisted phone number.
    pub phone: Option<String>,
    /// Persisted counters.
    pub counters: TaskCounters,
    /// Whether the account receives broadcasts.
    pub active: bool,
    /// Persisted notification token.
    pub notification_token: Option<NotificationToken>,
    /// Last token refresh.
    pub token_updated_at: Option<DateTime<Utc>>,
    /// Profile creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<PersistedUserData> for User {
    fn from(data: PersistedUserData) -> Self {
        Self::from_persisted(data)
    }
}

impl User {
    /// Creates a new active profile with zeroed counters and no token.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::EmptyDisplayName`] when the name is blank.
    pub fn new(profile: NewUserProfile, clock: &impl Clock) -> Result<Self, UserDomainError> {
        let display_name = profile.display_name.trim();
        if display_name.is_empty() {
            return Err(UserDomainError::EmptyDisplayName);
        }
        let phone = profile
            .phone
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        Ok(Self {
            id: profile.id,
            display_name: display_name.to_owned(),
            role: profile.role,
            phone,
            counters: TaskCounters::default(),
            active: true,
            notification_token: None,
            token_updated_at: None,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a user from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserData) -> Self {
        Self {
            id: data.id,
            display_name: data.display_name,
            role: data.role,
            phone: data.phone,
            counters: data.counters,
            active: data.active,
            notification_token: data.notification_token,
            token_updated_at: data.token_updated_at,
            created_at: data.created_at,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the account role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the contact phone, if any.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Returns the task counters.
    #[must_use]
    pub const fn counters(&self) -> TaskCounters {
        self.counters
    }

    /// Whether the account is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the current notification token, if any.
    #[must_use]
    pub const fn notification_token(&self) -> Option<&NotificationToken> {
        self.notification_token.as_ref()
    }

    /// Returns when the token was last refreshed.
    #[must_use]
    pub const fn token_updated_at(&self) -> Option<DateTime<Utc>> {
        self.token_updated_at
    }

    /// Returns the profile creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// True for active volunteers holding a token, the broadcast audience
    /// for new tasks.
    #[must_use]
    pub const fn is_notifiable_volunteer(&self) -> bool {
        matches!(self.role, Role::Volunteer) && self.active && self.notification_token.is_some()
    }

    /// Increments one of the task counters.
    pub const fn increment(&mut self, counter: TaskCounter) {
        self.counters.increment(counter);
    }

    /// Stores a freshly issued notification token.
    pub fn set_notification_token(&mut self, token: NotificationToken, issued_at: DateTime<Utc>) {
        self.notification_token = Some(token);
        self.token_updated_at = Some(issued_at);
    }

    /// Removes the notification token.
    pub fn clear_notification_token(&mut self) {
        self.notification_token = None;
    }

    /// Removes the token only when it still equals `stale`.
    ///
    /// Returns `true` when the token was cleared.
    pub fn clear_notification_token_if(&mut self, stale: &NotificationToken) -> bool {
        if self.notification_token.as_ref() == Some(stale) {
            self.notification_token = None;
            return true;
        }
        false
    }
}
