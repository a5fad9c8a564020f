//! [`TaskStore`] implementation for [`InMemoryStore`].

use super::{InMemoryStore, StoreState};
use crate::task::{
    domain::{Task, TaskId},
    ports::{TaskQuery, TaskStore, TaskStoreError, TaskStoreResult, TransitionFn},
};
use crate::user::domain::CounterIncrement;
use async_trait::async_trait;

fn apply_increment(state: &mut StoreState, increment: &CounterIncrement) -> TaskStoreResult<()> {
    let user = state
        .users
        .get_mut(&increment.user_id)
        .ok_or_else(|| TaskStoreError::UnknownUser(increment.user_id.clone()))?;
    user.increment(increment.counter);
    Ok(())
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn insert(&self, task: &Task, increment: CounterIncrement) -> TaskStoreResult<()> {
        let mut state = self.write().map_err(TaskStoreError::persistence)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskStoreError::DuplicateTask(task.id()));
        }
        apply_increment(&mut state, &increment)?;
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<Task>> {
        let state = self.read().map_err(TaskStoreError::persistence)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn transition(&self, id: TaskId, apply: TransitionFn) -> TaskStoreResult<Task> {
        let mut state = self.write().map_err(TaskStoreError::persistence)?;
        let current = state
            .tasks
            .get(&id)
            .cloned()
            .ok_or(TaskStoreError::NotFound(id))?;

        let write = apply(current)?;
        // The counter goes first: a missing owner must leave the task as is.
        if let Some(increment) = write.increment.as_ref() {
            apply_increment(&mut state, increment)?;
        }
        state.tasks.insert(id, write.task.clone());
        Ok(write.task)
    }

    async fn query(&self, query: &TaskQuery) -> TaskStoreResult<Vec<Task>> {
        let state = self.read().map_err(TaskStoreError::persistence)?;
        Ok(query.evaluate(state.tasks.values().cloned()))
    }
}
