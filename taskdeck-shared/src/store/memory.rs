/// In-memory store backend
///
/// Mirrors the PostgreSQL backend's observable behavior, including the
/// username uniqueness constraint and delete cascades, so the
/// coordinators can be exercised without a database.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{EntityStore, StoreError, UserFilter};
use crate::models::{NewTask, NewUser, Task, TaskId, User, UserId};

#[derive(Default)]
struct Inner {
    users: BTreeMap<UserId, User>,
    tasks: BTreeMap<TaskId, Task>,
    next_user_id: UserId,
    next_task_id: TaskId,
}

/// BTreeMap-backed [`EntityStore`]
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn find_user(&self, filter: UserFilter<'_>) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        let user = match filter {
            UserFilter::Id(id) => inner.users.get(&id).cloned(),
            UserFilter::Username(username) => {
                inner.users.values().find(|u| u.username == username).cloned()
            }
        };
        Ok(user)
    }

    async fn create_user(&self, draft: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.users.values().any(|u| u.username == draft.username) {
            return Err(StoreError::Duplicate("username"));
        }

        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            username: draft.username,
            password_hash: draft.password_hash,
            created_at: Utc::now(),
        };
        inner.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let existed = inner.users.remove(&id).is_some();
        if existed {
            // ON DELETE CASCADE
            inner.tasks.retain(|_, task| task.owner_id != id);
        }
        Ok(existed)
    }

    async fn find_task(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.tasks.get(&id).cloned())
    }

    async fn find_task_with_owner(&self, id: TaskId) -> Result<Option<(Task, User)>, StoreError> {
        let inner = self.inner.read().await;
        let Some(task) = inner.tasks.get(&id).cloned() else {
            return Ok(None);
        };
        let owner = inner
            .users
            .get(&task.owner_id)
            .cloned()
            .ok_or_else(|| StoreError::Backend(format!("task {id} has no owner row")))?;
        Ok(Some((task, owner)))
    }

    async fn tasks_for_owner(&self, owner: UserId) -> Result<Vec<Task>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .values()
            .filter(|task| task.owner_id == owner)
            .cloned()
            .collect())
    }

    async fn create_task(&self, draft: NewTask) -> Result<Task, StoreError> {
        let mut inner = self.inner.write().await;

        if !inner.users.contains_key(&draft.owner_id) {
            return Err(StoreError::Backend(format!(
                "owner {} does not exist",
                draft.owner_id
            )));
        }

        inner.next_task_id += 1;
        let now = Utc::now();
        let task = Task {
            id: inner.next_task_id,
            owner_id: draft.owner_id,
            name: draft.name,
            stage: draft.stage,
            created_at: now,
            updated_at: now,
        };
        inner.tasks.insert(task.id, task.clone());

        Ok(task)
    }

    async fn update_task(&self, task: &Task) -> Result<Task, StoreError> {
        let mut inner = self.inner.write().await;

        if !inner.tasks.contains_key(&task.id) {
            return Err(StoreError::Backend(format!(
                "task {} does not exist",
                task.id
            )));
        }

        inner.tasks.insert(task.id, task.clone());
        Ok(task.clone())
    }

    async fn delete_task(&self, id: TaskId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.tasks.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Stage;

    fn draft(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let store = MemoryStore::default();

        let user = store.create_user(draft("alice")).await.unwrap();
        assert!(user.id > 0);

        let by_name = store
            .find_user(UserFilter::Username("alice"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name.id, user.id);

        let by_id = store.find_user(UserFilter::Id(user.id)).await.unwrap();
        assert!(by_id.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = MemoryStore::default();
        store.create_user(draft("alice")).await.unwrap();

        let err = store.create_user(draft("alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("username")));
    }

    #[tokio::test]
    async fn test_delete_user_cascades_tasks() {
        let store = MemoryStore::default();
        let user = store.create_user(draft("alice")).await.unwrap();
        let task = store
            .create_task(NewTask {
                owner_id: user.id,
                name: "Write spec".to_string(),
                stage: Stage::Todo,
            })
            .await
            .unwrap();

        assert!(store.delete_user(user.id).await.unwrap());

        assert!(store.find_task(task.id).await.unwrap().is_none());
        assert!(!store.delete_user(user.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_task_requires_existing_owner() {
        let store = MemoryStore::default();

        let err = store
            .create_task(NewTask {
                owner_id: 42,
                name: "orphan".to_string(),
                stage: Stage::Todo,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn test_tasks_for_owner_filters() {
        let store = MemoryStore::default();
        let alice = store.create_user(draft("alice")).await.unwrap();
        let bob = store.create_user(draft("bob")).await.unwrap();

        for owner_id in [alice.id, alice.id, bob.id] {
            store
                .create_task(NewTask {
                    owner_id,
                    name: "t".to_string(),
                    stage: Stage::Todo,
                })
                .await
                .unwrap();
        }

        assert_eq!(store.tasks_for_owner(alice.id).await.unwrap().len(), 2);
        assert_eq!(store.tasks_for_owner(bob.id).await.unwrap().len(), 1);
    }
}
