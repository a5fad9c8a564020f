//! Domain types for notification intents and message rendering.

mod intent;
mod labels;
mod templates;

pub use intent::{
    Audience, CLICK_ACTION_OPEN_TASK, NotificationData, NotificationIntent, NotificationMessage,
    Recipient,
};
pub use labels::{kind_icon, kind_label, urgency_label};
pub use templates::{DEFAULT_VOLUNTEER_PLACEHOLDER, NotificationTemplates, TemplateError};
