//! Message templates rendered with `minijinja`.

use super::labels::{kind_icon, kind_label, urgency_label};
use super::NotificationMessage;
use crate::task::domain::{Task, TransitionKind};
use minijinja::{Environment, context};
use thiserror::Error;

/// Name used when a claimant display name is unavailable.
pub const DEFAULT_VOLUNTEER_PLACEHOLDER: &str = "A volunteer";

const CREATED_TITLE: &str = "{{ urgency }} {{ icon }} New task!";
const CREATED_BODY: &str = "{{ kind }}\n{{ title }}";
const TAKEN_TITLE: &str = "✅ Task taken!";
const TAKEN_BODY: &str = "{{ volunteer }} took: {{ title }}";
const COMPLETED_TITLE: &str = "🎉 Task completed!";
const COMPLETED_BODY: &str = "{{ volunteer }} finished: {{ title }}";

/// Errors raised while rendering a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template engine rejected a template.
    #[error("failed to render {event} template: {reason}")]
    Render {
        /// Event whose template failed.
        event: &'static str,
        /// Engine error text.
        reason: String,
    },
}

/// Renders notification messages for lifecycle transitions.
#[derive(Debug, Clone)]
pub struct NotificationTemplates {
    volunteer_placeholder: String,
}

impl Default for NotificationTemplates {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUNTEER_PLACEHOLDER)
    }
}

impl NotificationTemplates {
    /// Creates templates with the given fallback claimant name.
    #[must_use]
    pub fn new(volunteer_placeholder: impl Into<String>) -> Self {
        Self {
            volunteer_placeholder: volunteer_placeholder.into(),
        }
    }

    /// Returns the fallback claimant name.
    #[must_use]
    pub fn volunteer_placeholder(&self) -> &str {
        &self.volunteer_placeholder
    }

    /// Renders the message for a transition, or `None` for transitions that
    /// do not notify anyone.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Render`] when the engine fails.
    pub fn render(
        &self,
        kind: TransitionKind,
        task: &Task,
    ) -> Result<Option<NotificationMessage>, TemplateError> {
        let (title, body) = match kind {
            TransitionKind::Created => (CREATED_TITLE, CREATED_BODY),
            TransitionKind::Taken => (TAKEN_TITLE, TAKEN_BODY),
            TransitionKind::Completed => (COMPLETED_TITLE, COMPLETED_BODY),
            TransitionKind::Cancelled => return Ok(None),
        };

        let volunteer = task
            .claimant()
            .map(|claimant| claimant.display_name().trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.volunteer_placeholder);
        let values = context! {
            urgency => urgency_label(task.urgency()),
            icon => kind_icon(task.kind()),
            kind => kind_label(task.kind()),
            title => task.title(),
            volunteer => volunteer,
        };

        let environment = Environment::new();
        let render = |source: &str| {
            environment
                .render_str(source, &values)
                .map_err(|error| TemplateError::Render {
                    event: kind.as_str(),
                    reason: error.to_string(),
                })
        };
        Ok(Some(NotificationMessage {
            title: render(title)?,
            body: render(body)?,
        }))
    }
}
