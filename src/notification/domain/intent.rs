//! Resolved notification intents.

use crate::task::domain::{TaskId, TaskKind, TransitionKind, Urgency};
use crate::user::domain::{NotificationToken, UserId};
use serde::Serialize;
use std::collections::BTreeMap;

/// Client action attached to new-task notifications.
pub const CLICK_ACTION_OPEN_TASK: &str = "OPEN_TASK";

/// A user that will receive a notification, with the token resolved at
/// dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// Recipient identity.
    pub user_id: UserId,
    /// Token the transport delivers to.
    pub token: NotificationToken,
}

/// Rendered notification title and body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationMessage {
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
}

/// Data payload delivered alongside the visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationData {
    task_id: TaskId,
    event: TransitionKind,
    kind: Option<TaskKind>,
    urgency: Option<Urgency>,
    click_action: Option<&'static str>,
}

impl NotificationData {
    /// Payload for a newly posted task.
    #[must_use]
    pub const fn created(task_id: TaskId, kind: TaskKind, urgency: Urgency) -> Self {
        Self {
            task_id,
            event: TransitionKind::Created,
            kind: Some(kind),
            urgency: Some(urgency),
            click_action: Some(CLICK_ACTION_OPEN_TASK),
        }
    }

    /// Payload for a creator-targeted update.
    #[must_use]
    pub const fn update(task_id: TaskId, event: TransitionKind) -> Self {
        Self {
            task_id,
            event,
            kind: None,
            urgency: None,
            click_action: None,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the transition that produced the notification.
    #[must_use]
    pub const fn event(&self) -> TransitionKind {
        self.event
    }

    /// Returns the task kind, set for creations only.
    #[must_use]
    pub const fn kind(&self) -> Option<TaskKind> {
        self.kind
    }

    /// Returns the urgency, set for creations only.
    #[must_use]
    pub const fn urgency(&self) -> Option<Urgency> {
        self.urgency
    }

    /// Returns the client action, set for creations only.
    #[must_use]
    pub const fn click_action(&self) -> Option<&'static str> {
        self.click_action
    }

    /// Flattens the payload into the string map push transports expect.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("task_id".to_owned(), self.task_id.to_string());
        map.insert("event".to_owned(), self.event.as_str().to_owned());
        if let Some(kind) = self.kind {
            map.insert("type".to_owned(), kind.as_str().to_owned());
        }
        if let Some(urgency) = self.urgency {
            map.insert("urgency".to_owned(), urgency.as_str().to_owned());
        }
        if let Some(action) = self.click_action {
            map.insert("click_action".to_owned(), action.to_owned());
        }
        map
    }
}

/// How an intent is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Broadcast to every notifiable volunteer in one multicast.
    Volunteers,
    /// A single message to the task creator.
    Creator,
}

/// A computed recipients-and-message pair. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationIntent {
    /// Delivery mode.
    pub audience: Audience,
    /// Resolved recipients; may be empty.
    pub recipients: Vec<Recipient>,
    /// Rendered message.
    pub message: NotificationMessage,
    /// Data payload.
    pub data: NotificationData,
}

impl NotificationIntent {
    /// Returns the recipient tokens in recipient order.
    #[must_use]
    pub fn tokens(&self) -> Vec<NotificationToken> {
        self.recipients
            .iter()
            .map(|recipient| recipient.token.clone())
            .collect()
    }

    /// Whether there is anyone to deliver to.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}
