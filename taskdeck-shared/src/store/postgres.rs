/// PostgreSQL store backend
///
/// Connection pooling via sqlx `PgPool`; migrations run from the crate's
/// `migrations/` directory at startup.
///
/// # Example
///
/// ```no_run
/// use taskdeck_shared::store::{create_pool, run_migrations, DatabaseConfig, PgStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// };
///
/// let pool = create_pool(config).await?;
/// run_migrations(&pool).await?;
/// let store = PgStore::new(pool);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

use super::{EntityStore, StoreError, UserFilter};
use crate::models::{NewTask, NewUser, Task, TaskId, User, UserId};

/// Configuration for the database connection pool
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of idle connections to maintain
    pub min_connections: u32,

    /// Timeout for acquiring a connection from the pool (seconds)
    pub connect_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout_seconds: 30,
        }
    }
}

/// Creates a PostgreSQL connection pool and verifies connectivity
pub async fn create_pool(config: DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "creating database connection pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .connect(&config.url)
        .await?;

    // fail fast if the database is unreachable
    sqlx::query("SELECT 1").execute(&pool).await?;

    info!("database connection pool ready");
    Ok(pool)
}

/// Runs all pending migrations from `migrations/`
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("running database migrations");
    sqlx::migrate!("./migrations").run(pool).await
}

/// sqlx-backed [`EntityStore`]
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, username, password_hash, created_at";
const TASK_COLUMNS: &str = "id, owner_id, name, stage, created_at, updated_at";

#[async_trait]
impl EntityStore for PgStore {
    async fn find_user(&self, filter: UserFilter<'_>) -> Result<Option<User>, StoreError> {
        let user = match filter {
            UserFilter::Id(id) => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
                ))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
            }
            UserFilter::Username(username) => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
                ))
                .bind(username)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        Ok(user)
    }

    async fn create_user(&self, draft: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password_hash)
             VALUES ($1, $2)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(draft.username)
        .bind(draft.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_task(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn find_task_with_owner(&self, id: TaskId) -> Result<Option<(Task, User)>, StoreError> {
        let Some(task) = self.find_task(id).await? else {
            return Ok(None);
        };

        // the FK guarantees the owner row exists
        let owner = self
            .find_user(UserFilter::Id(task.owner_id))
            .await?
            .ok_or_else(|| StoreError::Backend(format!("task {id} has no owner row")))?;

        Ok(Some((task, owner)))
    }

    async fn tasks_for_owner(&self, owner: UserId) -> Result<Vec<Task>, StoreError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1 ORDER BY created_at"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn create_task(&self, draft: NewTask) -> Result<Task, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (owner_id, name, stage)
             VALUES ($1, $2, $3)
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(draft.owner_id)
        .bind(draft.name)
        .bind(draft.stage)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    async fn update_task(&self, task: &Task) -> Result<Task, StoreError> {
        // updated_at comes from the caller so its monotonicity survives
        // the round trip
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET name = $2, stage = $3, updated_at = $4
             WHERE id = $1
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(task.id)
        .bind(&task.name)
        .bind(task.stage)
        .bind(task.updated_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::Backend(format!("task {} does not exist", task.id)))?;

        Ok(task)
    }

    async fn delete_task(&self, id: TaskId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
