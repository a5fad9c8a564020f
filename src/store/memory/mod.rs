//! Thread-safe in-memory document store.

mod settings;
mod tasks;
mod users;

use crate::organization::OrganizationSettings;
use crate::task::domain::{Task, TaskId};
use crate::user::domain::{User, UserId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory store holding every collection under one lock.
///
/// A write lock spans each transaction, which linearizes transitions on a
/// task and keeps counter increments in the same atomic unit.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

#[derive(Debug, Default)]
struct StoreState {
    tasks: HashMap<TaskId, Task>,
    users: HashMap<UserId, User>,
    settings: Option<OrganizationSettings>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>, std::io::Error> {
        self.state.read().map_err(poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>, std::io::Error> {
        self.state.write().map_err(poisoned)
    }
}

fn poisoned<T>(err: PoisonError<T>) -> std::io::Error {
    std::io::Error::other(err.to_string())
}
