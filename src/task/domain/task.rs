//! Task aggregate root and lifecycle state machine.

use super::{ParseTaskStatusError, TaskDomainError, TaskId, TaskKind, Urgency};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Posted and waiting for a volunteer.
    Open,
    /// Claimed by exactly one volunteer.
    Taken,
    /// Finished by the claimant.
    Completed,
    /// Withdrawn by an admin before anyone claimed it.
    Cancelled,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Taken => "taken",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether `target` is reachable from `self` in one step.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Open, Self::Taken | Self::Cancelled) | (Self::Taken, Self::Completed)
        )
    }

    /// Whether a task in this status carries claimant fields.
    #[must_use]
    pub const fn has_claimant(self) -> bool {
        matches!(self, Self::Taken | Self::Completed)
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "taken" => Ok(Self::Taken),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user as recorded on a task: identity plus display name at the time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    id: UserId,
    display_name: String,
}

impl Participant {
    /// Creates a participant record.
    #[must_use]
    pub fn new(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }

    /// Returns the participant's identity.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Returns the display name captured on the task.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// Claim fields, present only while the task is taken or completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    claimant: Participant,
    claimed_at: DateTime<Utc>,
}

impl Claim {
    /// Creates claim fields.
    #[must_use]
    pub const fn new(claimant: Participant, claimed_at: DateTime<Utc>) -> Self {
        Self {
            claimant,
            claimed_at,
        }
    }

    /// Returns the claimant.
    #[must_use]
    pub const fn claimant(&self) -> &Participant {
        &self.claimant
    }

    /// Returns the claim timestamp.
    #[must_use]
    pub const fn claimed_at(&self) -> DateTime<Utc> {
        self.claimed_at
    }
}

/// Free-text origin and destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRoute {
    from: Option<String>,
    to: Option<String>,
}

impl TaskRoute {
    /// Creates a route, dropping blank endpoints.
    #[must_use]
    pub fn new(from: Option<String>, to: Option<String>) -> Self {
        Self {
            from: non_blank(from),
            to: non_blank(to),
        }
    }

    /// Returns the origin, if any.
    #[must_use]
    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    /// Returns the destination, if any.
    #[must_use]
    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }
}

/// Validated input for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Task category.
    pub kind: TaskKind,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: Option<String>,
    /// Urgency level.
    pub urgency: Urgency,
    /// Origin and destination.
    pub route: TaskRoute,
    /// Contact string shown to the claimant.
    pub contact: Option<String>,
}

/// Task aggregate root.
///
/// Deserialized documents pass through [`Task::from_persisted`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersistedTaskData")]
pub struct Task {
    id: TaskId,
    kind: TaskKind,
    title: String,
    description: Option<String>,
    urgency: Urgency,
    route: TaskRoute,
    contact: Option<String>,
    status: TaskStatus,
    creator: Participant,
    claim: Option<Claim>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted category.
    pub kind: TaskKind,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted urgency.
    pub urgency: Urgency,
    /// Persisted route.
    pub route: TaskRoute,
    /// Persisted contact.
    pub contact: Option<String>,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted creator.
    pub creator: Participant,
    /// Persisted claim fields.
    pub claim: Option<Claim>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted latest lifecycle timestamp.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PersistedTaskData> for Task {
    type Error = TaskDomainError;

    fn try_from(data: PersistedTaskData) -> Result<Self, Self::Error> {
        Self::from_persisted(data)
    }
}

impl Task {
    /// Creates an open task posted by `creator`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is blank.
    pub fn new(
        new_task: NewTask,
        creator: Participant,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let title = new_task.title.trim();
        if title.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        let timestamp = clock.utc();

        Ok(Self {
            id: TaskId::new(),
            kind: new_task.kind,
            title: title.to_owned(),
            description: non_blank(new_task.description),
            urgency: new_task.urgency,
            route: new_task.route,
            contact: non_blank(new_task.contact),
            status: TaskStatus::Open,
            creator,
            claim: None,
            created_at: timestamp,
            completed_at: None,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InconsistentClaim`] when claim fields are
    /// present for a status without a claimant (or missing for one with a
    /// claimant), or when the completion timestamp disagrees with the status.
    pub fn from_persisted(data: PersistedTaskData) -> Result<Self, TaskDomainError> {
        let claim_matches = data.claim.is_some() == data.status.has_claimant();
        let completion_matches =
            data.completed_at.is_some() == matches!(data.status, TaskStatus::Completed);
        if !claim_matches || !completion_matches {
            return Err(TaskDomainError::InconsistentClaim {
                task_id: data.id,
                status: data.status,
            });
        }

        Ok(Self {
            id: data.id,
            kind: data.kind,
            title: data.title,
            description: data.description,
            urgency: data.urgency,
            route: data.route,
            contact: data.contact,
            status: data.status,
            creator: data.creator,
            claim: data.claim,
            created_at: data.created_at,
            completed_at: data.completed_at,
            updated_at: data.updated_at,
        })
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task category.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the urgency.
    #[must_use]
    pub const fn urgency(&self) -> Urgency {
        self.urgency
    }

    /// Returns the route.
    #[must_use]
    pub const fn route(&self) -> &TaskRoute {
        &self.route
    }

    /// Returns the contact string, if any.
    #[must_use]
    pub fn contact(&self) -> Option<&str> {
        self.contact.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the admin who posted the task.
    #[must_use]
    pub const fn creator(&self) -> &Participant {
        &self.creator
    }

    /// Returns the claim fields, if the task is taken or completed.
    #[must_use]
    pub const fn claim(&self) -> Option<&Claim> {
        self.claim.as_ref()
    }

    /// Returns the claimant, if any.
    #[must_use]
    pub fn claimant(&self) -> Option<&Participant> {
        self.claim.as_ref().map(Claim::claimant)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the completion timestamp, if completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the latest lifecycle timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Claims the task for `claimant`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::AlreadyClaimed`] when the task is not open.
    pub fn claim_for(
        &mut self,
        claimant: Participant,
        clock: &impl Clock,
    ) -> Result<(), TaskDomainError> {
        if self.status != TaskStatus::Open {
            return Err(TaskDomainError::AlreadyClaimed {
                task_id: self.id,
                status: self.status,
            });
        }
        let timestamp = clock.utc();
        self.status = TaskStatus::Taken;
        self.claim = Some(Claim::new(claimant, timestamp));
        self.updated_at = timestamp;
        Ok(())
    }

    /// Completes the task on behalf of its claimant.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] unless the task is
    /// taken, and [`TaskDomainError::NotClaimant`] when `actor` is not the
    /// claimant.
    pub fn complete(&mut self, actor: &UserId, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.ensure_transition(TaskStatus::Completed)?;
        if self.claimant().map(Participant::id) != Some(actor) {
            return Err(TaskDomainError::NotClaimant {
                task_id: self.id,
                actor: actor.clone(),
            });
        }
        let timestamp = clock.utc();
        self.status = TaskStatus::Completed;
        self.completed_at = Some(timestamp);
        self.updated_at = timestamp;
        Ok(())
    }

    /// Cancels an open task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] unless the task is
    /// open.
    pub fn cancel(&mut self, clock: &impl Clock) -> Result<(), TaskDomainError> {
        self.ensure_transition(TaskStatus::Cancelled)?;
        self.status = TaskStatus::Cancelled;
        self.updated_at = clock.utc();
        Ok(())
    }

    fn ensure_transition(&self, target: TaskStatus) -> Result<(), TaskDomainError> {
        if self.status.can_transition_to(target) {
            return Ok(());
        }
        Err(TaskDomainError::InvalidTransition {
            task_id: self.id,
            from: self.status,
            to: target,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}
