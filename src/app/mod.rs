//! Composition root wiring the store, event bus, and services.

use crate::config::AppConfig;
use crate::notification::domain::NotificationTemplates;
use crate::notification::ports::PushTransport;
use crate::notification::services::NotificationDispatcher;
use crate::organization::OrganizationService;
use crate::session::{IdentityProvider, SessionResolver};
use crate::store::InMemoryStore;
use crate::task::adapters::BroadcastTransitionBus;
use crate::task::ports::TaskQuery;
use crate::task::services::{TaskFeed, TaskLifecycleService};
use crate::user::services::ProfileService;
use mockable::DefaultClock;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Lifecycle service over the in-memory store and broadcast bus.
pub type Lifecycle = TaskLifecycleService<InMemoryStore, BroadcastTransitionBus, DefaultClock>;

/// Profile service over the in-memory store.
pub type Profiles = ProfileService<InMemoryStore, InMemoryStore, DefaultClock>;

/// Settings service over the in-memory store.
pub type Organization = OrganizationService<InMemoryStore, DefaultClock>;

/// A running instance: services share one store and one event bus, and the
/// notification dispatcher listens on the bus in a background task.
pub struct AidConnect<T>
where
    T: PushTransport + 'static,
{
    config: AppConfig,
    store: Arc<InMemoryStore>,
    bus: Arc<BroadcastTransitionBus>,
    lifecycle: Arc<Lifecycle>,
    profiles: Profiles,
    organization: Organization,
    dispatcher: Arc<NotificationDispatcher<InMemoryStore, T>>,
    listener: JoinHandle<()>,
}

impl<T> AidConnect<T>
where
    T: PushTransport + 'static,
{
    /// Wires every component and spawns the dispatcher listener.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn start(config: AppConfig, transport: Arc<T>) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(DefaultClock);
        let bus = Arc::new(BroadcastTransitionBus::new(config.dispatch.event_buffer));

        let lifecycle = Arc::new(
            TaskLifecycleService::new(Arc::clone(&store), Arc::clone(&bus), Arc::clone(&clock))
                .with_max_transaction_attempts(config.lifecycle.max_transaction_attempts),
        );
        let profiles = ProfileService::new(Arc::clone(&store), Arc::clone(&store), Arc::clone(&clock));
        let organization = OrganizationService::new(Arc::clone(&store), clock);
        let dispatcher = Arc::new(NotificationDispatcher::new(
            Arc::clone(&store),
            transport,
            NotificationTemplates::new(config.dispatch.volunteer_placeholder.clone()),
        ));
        let listener = bus.spawn_listener(Arc::clone(&dispatcher));
        tracing::info!(
            event_buffer = config.dispatch.event_buffer,
            max_transaction_attempts = config.lifecycle.max_transaction_attempts,
            "aid connect started"
        );

        Self {
            config,
            store,
            bus,
            lifecycle,
            profiles,
            organization,
            dispatcher,
            listener,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Returns the shared store.
    #[must_use]
    pub const fn store(&self) -> &Arc<InMemoryStore> {
        &self.store
    }

    /// Returns the task lifecycle service.
    #[must_use]
    pub const fn lifecycle(&self) -> &Arc<Lifecycle> {
        &self.lifecycle
    }

    /// Returns the profile service.
    #[must_use]
    pub const fn profiles(&self) -> &Profiles {
        &self.profiles
    }

    /// Returns the organization settings service.
    #[must_use]
    pub const fn organization(&self) -> &Organization {
        &self.organization
    }

    /// Returns the notification dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &Arc<NotificationDispatcher<InMemoryStore, T>> {
        &self.dispatcher
    }

    /// Opens a live view over `query`.
    ///
    /// The feed subscribes before its first snapshot, so no transition
    /// committed after this call is missed.
    #[must_use]
    pub fn feed(&self, query: TaskQuery) -> TaskFeed<InMemoryStore> {
        TaskFeed::new(Arc::clone(&self.store), query, self.bus.subscribe())
    }

    /// Builds a session resolver over an identity provider.
    #[must_use]
    pub fn sessions<I>(&self, identity: Arc<I>) -> SessionResolver<I, InMemoryStore>
    where
        I: IdentityProvider,
    {
        SessionResolver::new(identity, Arc::clone(&self.store))
    }

    /// Stops accepting events and waits for the dispatcher to drain.
    ///
    /// Lifecycle handles cloned out of this instance keep the bus open;
    /// drop them first.
    pub async fn shutdown(self) {
        let Self {
            bus,
            lifecycle,
            listener,
            ..
        } = self;
        drop(lifecycle);
        drop(bus);
        if let Err(err) = listener.await {
            tracing::warn!(error = %err, "notification listener ended abnormally");
        }
    }
}
