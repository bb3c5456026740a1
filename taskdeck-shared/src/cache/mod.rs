/// Volatile key/value cache abstraction
///
/// The cache accelerates reads of users and tasks; it may lose data at
/// any time and is never the source of truth. Only two key schemes
/// exist: `user:<username>` and `task:<id>`. Values are JSON strings and
/// every entry carries a bounded TTL, so a stale entry left behind by a
/// crash self-heals without further writes.
///
/// Callers must treat every cache failure as a miss: a cache outage
/// degrades to direct store reads, never to a user-visible error.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub mod memory;
pub mod redis;

pub use memory::MemoryCache;
pub use self::redis::{RedisCache, RedisConfig};

/// Cache backend errors
///
/// Swallowed and logged at every call site; never surfaced to a caller.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Key/value store with per-entry TTL
#[async_trait]
pub trait Cache: Send + Sync {
    /// Looks up `key`; `None` on a miss or an expired entry
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key` for at most `ttl`
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Drops `key`; deleting an absent key is not an error
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
