/// Durable entity storage
///
/// The [`EntityStore`] trait is the system's source of truth for users
/// and tasks. Lookups are exact-match on indexed fields (`id`,
/// `username`). Unlike the cache, a store failure is always fatal to the
/// calling operation.
///
/// Relation loading is explicit: `tasks_for_owner` and
/// `find_task_with_owner` replace ORM-style back-references, so nothing
/// the store returns drags a hidden object graph into a cache entry.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewTask, NewUser, Task, TaskId, User, UserId};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{create_pool, run_migrations, DatabaseConfig, PgStore};

/// Durable store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique key violation on the named field
    #[error("duplicate {0}")]
    Duplicate(&'static str),

    /// Everything else: connection loss, constraint failures, I/O
    #[error("store error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if let Some(constraint) = db_err.constraint() {
                if constraint.contains("username") {
                    return StoreError::Duplicate("username");
                }
            }
        }
        StoreError::Backend(err.to_string())
    }
}

/// Exact-match lookup on an indexed user field
#[derive(Debug, Clone, Copy)]
pub enum UserFilter<'a> {
    Id(UserId),
    Username(&'a str),
}

/// Relational storage for users and tasks
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn find_user(&self, filter: UserFilter<'_>) -> Result<Option<User>, StoreError>;

    async fn create_user(&self, draft: NewUser) -> Result<User, StoreError>;

    /// Deletes the user row; owned task rows cascade with it.
    /// Returns whether a row existed.
    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError>;

    async fn find_task(&self, id: TaskId) -> Result<Option<Task>, StoreError>;

    /// Task plus its owner row, the relation load behind every
    /// sanitized task view
    async fn find_task_with_owner(&self, id: TaskId) -> Result<Option<(Task, User)>, StoreError>;

    /// All tasks owned by `owner`, oldest first
    async fn tasks_for_owner(&self, owner: UserId) -> Result<Vec<Task>, StoreError>;

    async fn create_task(&self, draft: NewTask) -> Result<Task, StoreError>;

    /// Persists the full row for `task.id`, including the caller's
    /// `updated_at` stamp
    async fn update_task(&self, task: &Task) -> Result<Task, StoreError>;

    /// Deletes the task row. Returns whether a row existed.
    async fn delete_task(&self, id: TaskId) -> Result<bool, StoreError>;
}
