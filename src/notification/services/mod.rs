//! Notification orchestration services.

mod dispatcher;

pub use dispatcher::{DispatchReport, NotificationDispatcher, ResolveError};
