/// Cache-aside coordinator for `User` entities
///
/// Owns user lookup, creation, and deletion, plus the `user:<username>`
/// cache entries. The cached value is the full internal record, hash
/// included, so signin can verify a cached user without a store read;
/// callers strip it via [`User::view`] before anything is serialized
/// outward.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::password::PasswordHasher;
use crate::cache::Cache;
use crate::error::DomainError;
use crate::models::{NewUser, User};
use crate::store::{EntityStore, UserFilter};

use super::{user_key, TaskBoard};

pub struct UserDirectory {
    store: Arc<dyn EntityStore>,
    cache: Arc<dyn Cache>,
    hasher: Arc<dyn PasswordHasher>,
    cache_ttl: Duration,
}

impl UserDirectory {
    pub fn new(
        store: Arc<dyn EntityStore>,
        cache: Arc<dyn Cache>,
        hasher: Arc<dyn PasswordHasher>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            hasher,
            cache_ttl,
        }
    }

    /// Cache-aside lookup by username
    ///
    /// Checks the cache first; on a miss reads the store and populates
    /// the cache before returning. Population is best-effort: a cache
    /// write failure never fails the read.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let key = user_key(username);

        match self.cache.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => return Ok(Some(user)),
                Err(err) => {
                    // undecodable entries are dropped, not trusted
                    tracing::warn!(%key, error = %err, "dropping undecodable cache entry");
                    let _ = self.cache.delete(&key).await;
                }
            },
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(%key, error = %err, "cache read failed, falling back to store");
            }
        }

        let user = self.store.find_user(UserFilter::Username(username)).await?;
        if let Some(user) = &user {
            self.populate(user).await;
        }

        Ok(user)
    }

    /// Hashes the password, persists the account, and populates the
    /// cache with the new record
    ///
    /// The duplicate-username check belongs to the caller, which decides
    /// its ordering against other validation; a race that slips past it
    /// still surfaces as a conflict from the store's unique constraint.
    pub async fn create_user(
        &self,
        username: &str,
        raw_password: &str,
    ) -> Result<User, DomainError> {
        let password_hash = self.hasher.hash(raw_password)?;

        let user = self
            .store
            .create_user(NewUser {
                username: username.to_string(),
                password_hash,
            })
            .await?;

        self.populate(&user).await;

        Ok(user)
    }

    /// Deletes `username` with the documented cascade order:
    ///
    /// 1. look up the user and its owned tasks,
    /// 2. drop the user's own cache entry,
    /// 3. delegate per-task invalidation to the board,
    /// 4. delete the durable row (task rows cascade in the store).
    ///
    /// If step 4 fails after 1-3, the cache is empty and the rows are
    /// live; the next read repopulates. Deleting an absent user fails
    /// with `NotFound`, so delete-then-delete yields success then
    /// `NotFound`.
    pub async fn delete_user(&self, username: &str, board: &TaskBoard) -> Result<(), DomainError> {
        let user = self
            .store
            .find_user(UserFilter::Username(username))
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("no user named {username}")))?;

        let tasks = self.store.tasks_for_owner(user.id).await?;

        self.invalidate(username).await;
        for task in &tasks {
            board.invalidate(task.id).await;
        }

        self.store.delete_user(user.id).await?;

        Ok(())
    }

    /// Best-effort eviction of the `user:` entry
    pub async fn invalidate(&self, username: &str) {
        let key = user_key(username);
        if let Err(err) = self.cache.delete(&key).await {
            tracing::warn!(%key, error = %err, "cache invalidation failed");
        }
    }

    async fn populate(&self, user: &User) {
        let key = user_key(&user.username);
        match serde_json::to_string(user) {
            Ok(raw) => {
                if let Err(err) = self.cache.set(&key, &raw, self.cache_ttl).await {
                    tracing::warn!(%key, error = %err, "cache population failed");
                }
            }
            Err(err) => {
                tracing::warn!(%key, error = %err, "failed to encode user for cache");
            }
        }
    }
}
