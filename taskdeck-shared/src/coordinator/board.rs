/// Cache-aside coordinator for `Task` entities
///
/// Owns task lookup, creation, mutation, and deletion, plus the
/// `task:<id>` cache entries. What gets cached and returned is always a
/// sanitized [`TaskView`]: the owner's password hash is stripped by
/// construction before a task reaches the cache, so no value reachable
/// via a task can leak it.
///
/// Every mutation also invalidates the owner's `user:` entry, because
/// that entry may embed data the mutation just made stale. This applies
/// symmetrically to create, update, and delete.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::Cache;
use crate::error::DomainError;
use crate::models::{NewTask, Stage, TaskId, TaskPatch, TaskView};
use crate::store::EntityStore;

use super::{task_key, UserDirectory};

pub struct TaskBoard {
    store: Arc<dyn EntityStore>,
    cache: Arc<dyn Cache>,
    directory: Arc<UserDirectory>,
    cache_ttl: Duration,
}

impl TaskBoard {
    pub fn new(
        store: Arc<dyn EntityStore>,
        cache: Arc<dyn Cache>,
        directory: Arc<UserDirectory>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            directory,
            cache_ttl,
        }
    }

    /// Cache-aside lookup by id
    ///
    /// On a store-level hit the owner's hash is stripped before the
    /// value is either cached or returned.
    pub async fn find_by_id(&self, id: TaskId) -> Result<Option<TaskView>, DomainError> {
        let key = task_key(id);

        match self.cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<TaskView>(&raw) {
                Ok(view) => return Ok(Some(view)),
                Err(err) => {
                    tracing::warn!(%key, error = %err, "dropping undecodable cache entry");
                    let _ = self.cache.delete(&key).await;
                }
            },
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(%key, error = %err, "cache read failed, falling back to store");
            }
        }

        let Some((task, owner)) = self.store.find_task_with_owner(id).await? else {
            return Ok(None);
        };

        let view = task.into_view(owner.view());
        self.populate(&view).await;

        Ok(Some(view))
    }

    /// Creates a task for `owner_username`
    ///
    /// Resolves the owner through the directory, persists, caches the
    /// sanitized view, and invalidates the owner's `user:` entry, which
    /// may embed a task list that is now stale.
    pub async fn create_task(
        &self,
        owner_username: &str,
        name: String,
        stage: Stage,
    ) -> Result<TaskView, DomainError> {
        let owner = self
            .directory
            .find_by_username(owner_username)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("no user named {owner_username}")))?;

        let task = self
            .store
            .create_task(NewTask {
                owner_id: owner.id,
                name,
                stage,
            })
            .await?;

        let view = task.into_view(owner.view());
        self.populate(&view).await;
        self.directory.invalidate(owner_username).await;

        Ok(view)
    }

    /// Applies a partial update to `id`
    ///
    /// Absent patch fields are left unchanged. `updated_at` strictly
    /// increases on every successful update. Re-caches the task and
    /// invalidates the owner's entry.
    pub async fn update_task(&self, id: TaskId, patch: TaskPatch) -> Result<TaskView, DomainError> {
        let (mut task, owner) = self
            .store
            .find_task_with_owner(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("no task with id {id}")))?;

        patch.apply(&mut task);
        task.touch();

        let task = self.store.update_task(&task).await?;

        let view = task.into_view(owner.view());
        self.populate(&view).await;
        self.directory.invalidate(&owner.username).await;

        Ok(view)
    }

    /// Deletes `id`: task entry first, then the owner's entry, then the
    /// durable row (cache-then-store, as everywhere)
    pub async fn delete_task(&self, id: TaskId) -> Result<(), DomainError> {
        let (task, owner) = self
            .store
            .find_task_with_owner(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("no task with id {id}")))?;

        self.invalidate(task.id).await;
        self.directory.invalidate(&owner.username).await;

        self.store.delete_task(id).await?;

        Ok(())
    }

    /// Best-effort eviction of the `task:` entry
    ///
    /// This is the primitive the directory's user-delete cascade
    /// delegates to.
    pub async fn invalidate(&self, id: TaskId) {
        let key = task_key(id);
        if let Err(err) = self.cache.delete(&key).await {
            tracing::warn!(%key, error = %err, "cache invalidation failed");
        }
    }

    async fn populate(&self, view: &TaskView) {
        let key = task_key(view.id);
        match serde_json::to_string(view) {
            Ok(raw) => {
                if let Err(err) = self.cache.set(&key, &raw, self.cache_ttl).await {
                    tracing::warn!(%key, error = %err, "cache population failed");
                }
            }
            Err(err) => {
                tracing::warn!(%key, error = %err, "failed to encode task for cache");
            }
        }
    }
}
