/// In-process cache backend
///
/// Backs the test-suite and cache-less local runs. Entries expire
/// lazily: an expired entry is dropped on the next read of its key.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::{Cache, CacheError};

struct Entry {
    value: String,
    expires_at: Instant,
}

/// HashMap-backed [`Cache`] with per-entry TTL
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = MemoryCache::default();

        cache
            .set("user:alice", "{}", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("user:alice").await.unwrap().as_deref(), Some("{}"));

        cache.delete("user:alice").await.unwrap();
        assert_eq!(cache.get("user:alice").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_miss_on_absent_key() {
        let cache = MemoryCache::default();
        assert_eq!(cache.get("task:1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_miss() {
        let cache = MemoryCache::default();

        cache
            .set("task:1", "{}", Duration::from_millis(0))
            .await
            .unwrap();

        assert_eq!(cache.get("task:1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_absent_key_is_ok() {
        let cache = MemoryCache::default();
        assert!(cache.delete("task:99").await.is_ok());
    }
}
