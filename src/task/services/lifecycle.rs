//! Service layer enforcing the task state machine against the store.

use crate::session::{PolicyError, Session};
use crate::task::{
    domain::{
        NewTask, Participant, Task, TaskDomainError, TaskId, TaskKind, TaskRoute,
        TaskTransitionEvent, TransitionKind, Urgency,
    },
    ports::{TaskQuery, TaskStore, TaskStoreError, TransitionFn, TransitionSink, TransitionWrite},
};
use crate::user::domain::{CounterIncrement, Role, TaskCounter};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Default bound on transaction attempts under store contention.
pub const DEFAULT_MAX_TRANSACTION_ATTEMPTS: u32 = 5;

/// Request payload for posting a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    kind: TaskKind,
    title: String,
    urgency: Urgency,
    description: Option<String>,
    location_from: Option<String>,
    location_to: Option<String>,
    contact: Option<String>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(kind: TaskKind, title: impl Into<String>, urgency: Urgency) -> Self {
        Self {
            kind,
            title: title.into(),
            urgency,
            description: None,
            location_from: None,
            location_to: None,
            contact: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the origin and destination. Blank values are dropped.
    #[must_use]
    pub fn with_locations(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.location_from = Some(from.into());
        self.location_to = Some(to.into());
        self
    }

    /// Sets the contact string. Without one, the creator's phone is used.
    #[must_use]
    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// The referenced task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// Validation or state machine rejection.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// The actor lacks the role the operation needs.
    #[error(transparent)]
    Unauthorized(#[from] PolicyError),
    /// Store operation failed.
    #[error(transparent)]
    Store(TaskStoreError),
}

impl From<TaskStoreError> for TaskLifecycleError {
    fn from(err: TaskStoreError) -> Self {
        match err {
            TaskStoreError::NotFound(task_id) => Self::NotFound(task_id),
            TaskStoreError::Rejected(domain) => Self::Domain(domain),
            other => Self::Store(other),
        }
    }
}

impl TaskLifecycleError {
    /// True when a claim lost the race for the task.
    #[must_use]
    pub const fn is_already_claimed(&self) -> bool {
        matches!(self, Self::Domain(TaskDomainError::AlreadyClaimed { .. }))
    }

    /// True for role or claimant rejections.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized(_) | Self::Domain(TaskDomainError::NotClaimant { .. })
        )
    }

    /// Message suitable for showing to the acting user.
    ///
    /// Claim losers get a dedicated message so the client refreshes instead
    /// of retrying.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "This task no longer exists.",
            Self::Domain(TaskDomainError::AlreadyClaimed { .. }) => {
                "This task has already been claimed by another volunteer."
            }
            Self::Domain(TaskDomainError::InvalidTransition { .. }) => {
                "This task can no longer be changed. Refresh to see its current state."
            }
            Self::Domain(TaskDomainError::NotClaimant { .. }) => {
                "Only the volunteer who claimed this task can complete it."
            }
            Self::Domain(TaskDomainError::EmptyTitle) => "Please enter a title for the task.",
            Self::Domain(
                TaskDomainError::UnknownTaskKind(_) | TaskDomainError::UnknownUrgency(_),
            ) => "Please choose a task type and urgency.",
            Self::Unauthorized(_) => "You are not allowed to perform this action.",
            Self::Domain(TaskDomainError::InconsistentClaim { .. }) | Self::Store(_) => {
                "Something went wrong. Please try again."
            }
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle engine.
///
/// Each operation commits through a single store transaction and then
/// publishes a [`TaskTransitionEvent`]; publication never affects the
/// operation's result.
#[derive(Clone)]
pub struct TaskLifecycleService<S, E, C>
where
    S: TaskStore,
    E: TransitionSink,
    C: Clock + Send + Sync + 'static,
{
    store: Arc<S>,
    events: Arc<E>,
    clock: Arc<C>,
    max_attempts: u32,
}

impl<S, E, C> TaskLifecycleService<S, E, C>
where
    S: TaskStore,
    E: TransitionSink,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(store: Arc<S>, events: Arc<E>, clock: Arc<C>) -> Self {
        Self {
            store,
            events,
            clock,
            max_attempts: DEFAULT_MAX_TRANSACTION_ATTEMPTS,
        }
    }

    /// Sets how many times a contended transaction is attempted.
    ///
    /// Values below one are raised to one.
    #[must_use]
    pub fn with_max_transaction_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Posts a new open task on behalf of an admin.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Unauthorized`] for non-admins,
    /// [`TaskLifecycleError::Domain`] for a blank title, and
    /// [`TaskLifecycleError::Store`] when persistence fails.
    pub async fn create_task(
        &self,
        session: &Session,
        request: CreateTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        session.require_role(Role::Admin)?;

        let contact = request
            .contact
            .filter(|value| !value.trim().is_empty())
            .or_else(|| session.phone().map(str::to_owned));
        let new_task = NewTask {
            kind: request.kind,
            title: request.title,
            description: request.description,
            urgency: request.urgency,
            route: TaskRoute::new(request.location_from, request.location_to),
            contact,
        };
        let task = Task::new(new_task, participant(session), &*self.clock)?;

        let increment = CounterIncrement::new(session.user_id().clone(), TaskCounter::Created);
        self.store.insert(&task, increment).await?;

        tracing::info!(
            task_id = %task.id(),
            actor = %session.user_id(),
            kind = task.kind().as_str(),
            urgency = task.urgency().as_str(),
            "task created"
        );
        self.publish(TransitionKind::Created, &task);
        Ok(task)
    }

    /// Claims an open task for the acting volunteer.
    ///
    /// Exactly one of any number of concurrent claims on the same task
    /// succeeds; the others fail with
    /// [`TaskDomainError::AlreadyClaimed`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for a missing task,
    /// [`TaskLifecycleError::Domain`] when the task is not open,
    /// [`TaskLifecycleError::Unauthorized`] for non-volunteers, and
    /// [`TaskLifecycleError::Store`] when persistence fails.
    pub async fn claim_task(&self, session: &Session, task_id: TaskId) -> TaskLifecycleResult<Task> {
        session.require_role(Role::Volunteer)?;
        let claimant = participant(session);
        let clock = Arc::clone(&self.clock);

        let result = self
            .run_transition(task_id, || {
                let claimant = claimant.clone();
                let clock = Arc::clone(&clock);
                let step: TransitionFn = Box::new(move |mut task: Task| {
                    let increment =
                        CounterIncrement::new(claimant.id().clone(), TaskCounter::Taken);
                    task.claim_for(claimant, &*clock)?;
                    Ok(TransitionWrite::with_increment(task, increment))
                });
                step
            })
            .await;

        match result {
            Ok(task) => {
                tracing::info!(task_id = %task_id, actor = %session.user_id(), "task claimed");
                self.publish(TransitionKind::Taken, &task);
                Ok(task)
            }
            Err(err) => {
                if err.is_already_claimed() {
                    tracing::debug!(task_id = %task_id, actor = %session.user_id(), "claim lost");
                }
                Err(err)
            }
        }
    }

    /// Completes a taken task on behalf of its claimant.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for a missing task,
    /// [`TaskLifecycleError::Domain`] when the task is not taken or the
    /// actor is not its claimant, and [`TaskLifecycleError::Store`] when
    /// persistence fails.
    pub async fn complete_task(
        &self,
        session: &Session,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Task> {
        let actor = session.user_id().clone();
        let clock = Arc::clone(&self.clock);

        let task = self
            .run_transition(task_id, || {
                let actor = actor.clone();
                let clock = Arc::clone(&clock);
                let step: TransitionFn = Box::new(move |mut task: Task| {
                    task.complete(&actor, &*clock)?;
                    let increment = CounterIncrement::new(actor, TaskCounter::Completed);
                    Ok(TransitionWrite::with_increment(task, increment))
                });
                step
            })
            .await?;

        tracing::info!(task_id = %task_id, actor = %session.user_id(), "task completed");
        self.publish(TransitionKind::Completed, &task);
        Ok(task)
    }

    /// Cancels an open task on behalf of an admin.
    ///
    /// Claimed tasks cannot be cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Unauthorized`] for non-admins,
    /// [`TaskLifecycleError::NotFound`] for a missing task,
    /// [`TaskLifecycleError::Domain`] when the task is not open, and
    /// [`TaskLifecycleError::Store`] when persistence fails.
    pub async fn cancel_task(
        &self,
        session: &Session,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Task> {
        session.require_role(Role::Admin)?;
        let clock = Arc::clone(&self.clock);

        let task = self
            .run_transition(task_id, || {
                let clock = Arc::clone(&clock);
                let step: TransitionFn = Box::new(move |mut task: Task| {
                    task.cancel(&*clock)?;
                    Ok(TransitionWrite::task(task))
                });
                step
            })
            .await?;

        tracing::info!(task_id = %task_id, actor = %session.user_id(), "task cancelled");
        self.publish(TransitionKind::Cancelled, &task);
        Ok(task)
    }

    /// Retrieves a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist.
    pub async fn find_task(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.store
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))
    }

    /// Open tasks, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Store`] when the query fails.
    pub async fn open_tasks(&self) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.store.query(&TaskQuery::open()).await?)
    }

    /// Tasks claimed by the acting user, most recently claimed first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Store`] when the query fails.
    pub async fn my_claimed_tasks(&self, session: &Session) -> TaskLifecycleResult<Vec<Task>> {
        let query = TaskQuery::claimed_by(session.user_id().clone());
        Ok(self.store.query(&query).await?)
    }

    /// Every task for the admin overview, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Unauthorized`] for non-admins and
    /// [`TaskLifecycleError::Store`] when the query fails.
    pub async fn all_tasks(&self, session: &Session) -> TaskLifecycleResult<Vec<Task>> {
        session.require_role(Role::Admin)?;
        Ok(self.store.query(&TaskQuery::all()).await?)
    }

    /// Runs a transition, retrying with a fresh step while the store
    /// reports contention.
    async fn run_transition<F>(&self, task_id: TaskId, build: F) -> TaskLifecycleResult<Task>
    where
        F: Fn() -> TransitionFn + Send + Sync,
    {
        let mut attempt = 1;
        loop {
            match self.store.transition(task_id, build()).await {
                Err(TaskStoreError::Contention(_)) if attempt < self.max_attempts => {
                    tracing::debug!(%task_id, attempt, "retrying contended transition");
                    attempt += 1;
                }
                result => return result.map_err(TaskLifecycleError::from),
            }
        }
    }

    fn publish(&self, kind: TransitionKind, task: &Task) {
        let event = TaskTransitionEvent::new(kind, task.clone(), &*self.clock);
        self.events.publish(event);
    }
}

fn participant(session: &Session) -> Participant {
    Participant::new(session.user_id().clone(), session.display_name())
}
