//! Cache coherence tests for the coordinator layer
//!
//! Exercises `UserDirectory` and `TaskBoard` against the in-memory
//! store and cache backends: population on miss, cross-entity
//! invalidation cascades, password hygiene at the public boundaries,
//! and behavior under a failing cache.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use taskdeck_shared::auth::password::{PasswordError, PasswordHasher};
use taskdeck_shared::cache::{Cache, CacheError, MemoryCache};
use taskdeck_shared::coordinator::{TaskBoard, UserDirectory};
use taskdeck_shared::error::DomainError;
use taskdeck_shared::models::{Stage, TaskPatch};
use taskdeck_shared::store::{EntityStore, MemoryStore};

const TTL: Duration = Duration::from_secs(60);

/// Cheap stand-in for Argon2 so the suite stays fast; the coordinators
/// only see the `PasswordHasher` capability either way.
struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        Ok(format!("hashed::{plaintext}"))
    }

    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordError> {
        Ok(hash == format!("hashed::{plaintext}"))
    }
}

/// Cache whose every operation fails, simulating a full outage
struct BrokenCache;

#[async_trait]
impl Cache for BrokenCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Backend("cache is down".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Backend("cache is down".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Backend("cache is down".to_string()))
    }
}

struct Harness {
    directory: Arc<UserDirectory>,
    board: TaskBoard,
    cache: Arc<MemoryCache>,
}

fn harness() -> Harness {
    let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::default());
    let cache = Arc::new(MemoryCache::default());
    let cache_dyn: Arc<dyn Cache> = cache.clone();

    let directory = Arc::new(UserDirectory::new(
        store.clone(),
        cache_dyn.clone(),
        Arc::new(PlainHasher),
        TTL,
    ));
    let board = TaskBoard::new(store, cache_dyn, directory.clone(), TTL);

    Harness {
        directory,
        board,
        cache,
    }
}

fn broken_cache_harness() -> Harness {
    let store: Arc<dyn EntityStore> = Arc::new(MemoryStore::default());
    let cache_dyn: Arc<dyn Cache> = Arc::new(BrokenCache);

    let directory = Arc::new(UserDirectory::new(
        store.clone(),
        cache_dyn.clone(),
        Arc::new(PlainHasher),
        TTL,
    ));
    let board = TaskBoard::new(store, cache_dyn, directory.clone(), TTL);

    Harness {
        directory,
        board,
        // inspectable cache unused on this path
        cache: Arc::new(MemoryCache::default()),
    }
}

#[tokio::test]
async fn find_by_username_populates_cache_on_store_hit() {
    let h = harness();
    h.directory.create_user("alice", "secret1").await.unwrap();

    // start from a cold cache
    h.cache.delete("user:alice").await.unwrap();
    assert!(h.cache.get("user:alice").await.unwrap().is_none());

    let user = h.directory.find_by_username("alice").await.unwrap();
    assert!(user.is_some());

    assert!(h.cache.get("user:alice").await.unwrap().is_some());
}

#[tokio::test]
async fn find_by_username_misses_cleanly_for_unknown_user() {
    let h = harness();

    assert!(h.directory.find_by_username("nobody").await.unwrap().is_none());
    assert!(h.cache.get("user:nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn create_user_populates_cache() {
    let h = harness();

    h.directory.create_user("alice", "secret1").await.unwrap();

    assert!(h.cache.get("user:alice").await.unwrap().is_some());
}

#[tokio::test]
async fn delete_user_cascades_into_task_cache() {
    let h = harness();
    h.directory.create_user("alice", "secret1").await.unwrap();

    let t1 = h
        .board
        .create_task("alice", "one".to_string(), Stage::Todo)
        .await
        .unwrap();
    let t2 = h
        .board
        .create_task("alice", "two".to_string(), Stage::Doing)
        .await
        .unwrap();

    // make sure every entry is warm
    h.board.find_by_id(t1.id).await.unwrap();
    h.board.find_by_id(t2.id).await.unwrap();
    h.directory.find_by_username("alice").await.unwrap();
    assert!(h.cache.get("user:alice").await.unwrap().is_some());

    h.directory.delete_user("alice", &h.board).await.unwrap();

    assert!(h.cache.get("user:alice").await.unwrap().is_none());
    assert!(h.cache.get(&format!("task:{}", t1.id)).await.unwrap().is_none());
    assert!(h.cache.get(&format!("task:{}", t2.id)).await.unwrap().is_none());

    // rows are gone too, cascade included
    assert!(h.board.find_by_id(t1.id).await.unwrap().is_none());
    assert!(h.board.find_by_id(t2.id).await.unwrap().is_none());
    assert!(h.directory.find_by_username("alice").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_then_delete_yields_not_found() {
    let h = harness();
    h.directory.create_user("alice", "secret1").await.unwrap();

    h.directory.delete_user("alice", &h.board).await.unwrap();

    let err = h.directory.delete_user("alice", &h.board).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn task_views_never_carry_a_password() {
    let h = harness();
    h.directory.create_user("alice", "secret1").await.unwrap();

    let created = h
        .board
        .create_task("alice", "Write spec".to_string(), Stage::Todo)
        .await
        .unwrap();

    // the returned view
    let json = serde_json::to_string(&created).unwrap();
    assert!(!json.contains("password"));
    assert!(!json.contains("hashed::"));

    // the cached value, straight off the cache
    let raw = h
        .cache
        .get(&format!("task:{}", created.id))
        .await
        .unwrap()
        .expect("task should be cached");
    assert!(!raw.contains("password"));
    assert!(!raw.contains("hashed::"));

    // a cache-aside read through the cold path
    h.cache.delete(&format!("task:{}", created.id)).await.unwrap();
    let reread = h.board.find_by_id(created.id).await.unwrap().unwrap();
    let json = serde_json::to_string(&reread).unwrap();
    assert!(!json.contains("password"));
}

#[tokio::test]
async fn user_views_never_carry_a_password() {
    let h = harness();
    let user = h.directory.create_user("alice", "secret1").await.unwrap();

    let json = serde_json::to_string(&user.view()).unwrap();
    assert!(!json.contains("password"));
    assert!(!json.contains("hashed::"));
}

#[tokio::test]
async fn update_is_strictly_monotonic_even_back_to_back() {
    let h = harness();
    h.directory.create_user("alice", "secret1").await.unwrap();
    let task = h
        .board
        .create_task("alice", "tick".to_string(), Stage::Todo)
        .await
        .unwrap();

    let first = h
        .board
        .update_task(task.id, TaskPatch::default())
        .await
        .unwrap();
    let second = h
        .board
        .update_task(task.id, TaskPatch::default())
        .await
        .unwrap();

    assert!(first.updated_at > task.updated_at);
    assert!(second.updated_at > first.updated_at);
}

#[tokio::test]
async fn update_applies_only_present_fields() {
    let h = harness();
    h.directory.create_user("alice", "secret1").await.unwrap();
    let task = h
        .board
        .create_task("alice", "Write spec".to_string(), Stage::Todo)
        .await
        .unwrap();

    let updated = h
        .board
        .update_task(
            task.id,
            TaskPatch {
                name: None,
                stage: Some(Stage::Done),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Write spec");
    assert_eq!(updated.stage, Stage::Done);
}

#[tokio::test]
async fn update_missing_task_is_not_found() {
    let h = harness();

    let err = h
        .board
        .update_task(999, TaskPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn every_task_mutation_invalidates_the_owner_entry() {
    let h = harness();
    h.directory.create_user("alice", "secret1").await.unwrap();

    // create
    let task = h
        .board
        .create_task("alice", "one".to_string(), Stage::Todo)
        .await
        .unwrap();
    assert!(h.cache.get("user:alice").await.unwrap().is_none());

    // update
    h.directory.find_by_username("alice").await.unwrap();
    assert!(h.cache.get("user:alice").await.unwrap().is_some());
    h.board
        .update_task(task.id, TaskPatch { name: None, stage: Some(Stage::Done) })
        .await
        .unwrap();
    assert!(h.cache.get("user:alice").await.unwrap().is_none());

    // delete
    h.directory.find_by_username("alice").await.unwrap();
    h.board.delete_task(task.id).await.unwrap();
    assert!(h.cache.get("user:alice").await.unwrap().is_none());
    assert!(h.cache.get(&format!("task:{}", task.id)).await.unwrap().is_none());
}

#[tokio::test]
async fn signup_then_create_then_read_embeds_sanitized_owner() {
    let h = harness();
    h.directory.create_user("alice", "secret1").await.unwrap();

    let created = h
        .board
        .create_task("alice", "Write spec".to_string(), Stage::Todo)
        .await
        .unwrap();

    let found = h.board.find_by_id(created.id).await.unwrap().unwrap();

    assert_eq!(found.name, "Write spec");
    assert_eq!(found.stage, Stage::Todo);
    assert_eq!(found.owner.username, "alice");
    assert!(!serde_json::to_string(&found).unwrap().contains("password"));
}

#[tokio::test]
async fn undecodable_cache_entry_falls_back_to_store() {
    let h = harness();
    h.directory.create_user("alice", "secret1").await.unwrap();

    h.cache
        .set("user:alice", "not json at all", TTL)
        .await
        .unwrap();

    let user = h.directory.find_by_username("alice").await.unwrap();
    assert_eq!(user.unwrap().username, "alice");

    // the poisoned entry was replaced by a fresh population
    let raw = h.cache.get("user:alice").await.unwrap().unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&raw).is_ok());
}

#[tokio::test]
async fn cache_outage_degrades_to_store_reads() {
    let h = broken_cache_harness();

    let user = h.directory.create_user("alice", "secret1").await.unwrap();
    assert_eq!(user.username, "alice");

    let found = h.directory.find_by_username("alice").await.unwrap();
    assert!(found.is_some());

    let task = h
        .board
        .create_task("alice", "resilient".to_string(), Stage::Todo)
        .await
        .unwrap();
    assert!(h.board.find_by_id(task.id).await.unwrap().is_some());

    h.board
        .update_task(task.id, TaskPatch { name: Some("still here".to_string()), stage: None })
        .await
        .unwrap();
    h.board.delete_task(task.id).await.unwrap();
    h.directory.delete_user("alice", &h.board).await.unwrap();
}

#[tokio::test]
async fn create_task_for_unknown_owner_is_not_found() {
    let h = harness();

    let err = h
        .board
        .create_task("ghost", "nope".to_string(), Stage::Todo)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn duplicate_signup_race_surfaces_as_conflict() {
    let h = harness();
    h.directory.create_user("alice", "secret1").await.unwrap();

    // the caller-side duplicate check was skipped; the store's unique
    // constraint still holds the line
    let err = h.directory.create_user("alice", "other").await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}
