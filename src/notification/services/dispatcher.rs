//! Resolves and delivers notifications for task transitions.

use crate::notification::domain::{
    Audience, NotificationData, NotificationIntent, NotificationTemplates, Recipient,
    TemplateError,
};
use crate::notification::ports::{PushTransport, PushTransportError};
use crate::task::domain::{TaskTransitionEvent, TransitionKind};
use crate::task::ports::TransitionListener;
use crate::user::domain::{NotificationToken, User, UserId};
use crate::user::ports::{UserDirectory, UserDirectoryError};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Failures while computing a notification intent.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Recipient lookup failed.
    #[error(transparent)]
    Directory(#[from] UserDirectoryError),
    /// Message rendering failed.
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Summary of one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Tokens a send was attempted for.
    pub attempted: usize,
    /// Tokens the transport accepted.
    pub delivered: usize,
    /// Tokens that failed, including whole-request failures.
    pub failed: usize,
    /// Stale tokens removed from user records.
    pub tokens_cleared: usize,
}

/// Translates transition events into push notifications.
#[derive(Clone)]
pub struct NotificationDispatcher<U, T>
where
    U: UserDirectory,
    T: PushTransport,
{
    directory: Arc<U>,
    transport: Arc<T>,
    templates: NotificationTemplates,
}

impl<U, T> NotificationDispatcher<U, T>
where
    U: UserDirectory,
    T: PushTransport,
{
    /// Creates a dispatcher.
    #[must_use]
    pub const fn new(
        directory: Arc<U>,
        transport: Arc<T>,
        templates: NotificationTemplates,
    ) -> Self {
        Self {
            directory,
            transport,
            templates,
        }
    }

    /// Computes recipients and message for an event.
    ///
    /// Returns `None` for transitions that notify nobody. An intent may
    /// still carry zero recipients.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the directory lookup or rendering fails.
    pub async fn resolve(
        &self,
        event: &TaskTransitionEvent,
    ) -> Result<Option<NotificationIntent>, ResolveError> {
        let task = event.task();
        let Some(message) = self.templates.render(event.kind(), task)? else {
            return Ok(None);
        };

        let (audience, recipients, data): (Audience, Vec<Recipient>, NotificationData) =
            match event.kind() {
                TransitionKind::Created => {
                    let volunteers = self.directory.find_notifiable_volunteers().await?;
                    (
                        Audience::Volunteers,
                        volunteers.iter().filter_map(recipient).collect(),
                        NotificationData::created(task.id(), task.kind(), task.urgency()),
                    )
                }
                kind @ (TransitionKind::Taken | TransitionKind::Completed) => {
                    let creator = self.directory.find_by_id(task.creator().id()).await?;
                    (
                        Audience::Creator,
                        creator.as_ref().and_then(recipient).into_iter().collect(),
                        NotificationData::update(task.id(), kind),
                    )
                }
                TransitionKind::Cancelled => return Ok(None),
            };

        Ok(Some(NotificationIntent {
            audience,
            recipients,
            message,
            data,
        }))
    }

    /// Resolves and delivers the notification for an event.
    ///
    /// Never fails: every error is logged and reflected in the report.
    pub async fn dispatch(&self, event: &TaskTransitionEvent) -> DispatchReport {
        let intent = match self.resolve(event).await {
            Ok(Some(intent)) => intent,
            Ok(None) => return DispatchReport::default(),
            Err(err) => {
                tracing::warn!(
                    task_id = %event.task_id(),
                    kind = event.kind().as_str(),
                    error = %err,
                    "failed to resolve notification"
                );
                return DispatchReport::default();
            }
        };
        if intent.is_empty() {
            tracing::debug!(
                task_id = %event.task_id(),
                kind = event.kind().as_str(),
                "no notification recipients"
            );
            return DispatchReport::default();
        }

        let report = match intent.audience {
            Audience::Volunteers => self.multicast(&intent).await,
            Audience::Creator => self.unicast(&intent).await,
        };
        tracing::info!(
            task_id = %event.task_id(),
            kind = event.kind().as_str(),
            recipients = report.attempted,
            delivered = report.delivered,
            failed = report.failed,
            tokens_cleared = report.tokens_cleared,
            "notification dispatched"
        );
        report
    }

    async fn multicast(&self, intent: &NotificationIntent) -> DispatchReport {
        let tokens = intent.tokens();
        let mut report = DispatchReport {
            attempted: tokens.len(),
            ..DispatchReport::default()
        };
        let outcomes = match self
            .transport
            .send_multicast(&tokens, &intent.message, &intent.data)
            .await
        {
            Ok(outcomes) => outcomes,
            Err(err) => {
                log_transport_error(intent, &err);
                report.failed = tokens.len();
                return report;
            }
        };
        if outcomes.len() != tokens.len() {
            tracing::warn!(
                task_id = %intent.data.task_id(),
                expected = tokens.len(),
                received = outcomes.len(),
                "multicast outcome count mismatch"
            );
        }

        for (index, recipient) in intent.recipients.iter().enumerate() {
            match outcomes.get(index) {
                Some(outcome) if outcome.is_delivered() => report.delivered += 1,
                Some(outcome) => {
                    report.failed += 1;
                    if outcome.is_stale_token()
                        && self.clear_stale(&recipient.user_id, &recipient.token).await
                    {
                        report.tokens_cleared += 1;
                    }
                }
                None => report.failed += 1,
            }
        }
        report
    }

    async fn unicast(&self, intent: &NotificationIntent) -> DispatchReport {
        let mut report = DispatchReport::default();
        for recipient in &intent.recipients {
            report.attempted += 1;
            match self
                .transport
                .send(&recipient.token, &intent.message, &intent.data)
                .await
            {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    report.failed += 1;
                    log_transport_error(intent, &err);
                    if err.is_stale_token()
                        && self.clear_stale(&recipient.user_id, &recipient.token).await
                    {
                        report.tokens_cleared += 1;
                    }
                }
            }
        }
        report
    }

    async fn clear_stale(&self, user_id: &UserId, token: &NotificationToken) -> bool {
        match self.directory.clear_token_if_matches(user_id, token).await {
            Ok(cleared) => cleared,
            Err(err) => {
                tracing::warn!(user_id = %user_id, error = %err, "failed to clear stale token");
                false
            }
        }
    }
}

fn recipient(user: &User) -> Option<Recipient> {
    user.notification_token().map(|token| Recipient {
        user_id: user.id().clone(),
        token: token.clone(),
    })
}

fn log_transport_error(intent: &NotificationIntent, err: &PushTransportError) {
    tracing::warn!(
        task_id = %intent.data.task_id(),
        kind = intent.data.event().as_str(),
        error = %err,
        "notification delivery failed"
    );
}

#[async_trait]
impl<U, T> TransitionListener for NotificationDispatcher<U, T>
where
    U: UserDirectory,
    T: PushTransport,
{
    async fn on_transition(&self, event: &TaskTransitionEvent) {
        self.dispatch(event).await;
    }
}
