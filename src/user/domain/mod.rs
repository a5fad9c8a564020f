//! Domain model for user accounts.

mod error;
mod ids;
mod user;

pub use error::{ParseRoleError, UserDomainError};
pub use ids::{NotificationToken, UserId};
pub use user::{
    CounterIncrement, NewUserProfile, PersistedUserData, Role, TaskCounter, TaskCounters, User,
};
