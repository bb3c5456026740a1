//! # Taskdeck API Server
//!
//! Multi-user task tracker: stateless signed-token authentication on
//! top of a cache-aside layer that keeps the user and task caches
//! coherent across mutations.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskdeck-api
//! ```

use std::sync::Arc;
use std::time::Duration;

use taskdeck_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskdeck_shared::auth::{Argon2Hasher, AuthorizationGate, PasswordHasher, TokenService};
use taskdeck_shared::cache::{Cache, RedisCache, RedisConfig};
use taskdeck_shared::coordinator::{TaskBoard, UserDirectory};
use taskdeck_shared::store::{self, DatabaseConfig, EntityStore, PgStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck_api=debug,taskdeck_shared=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Taskdeck API v{} starting", env!("CARGO_PKG_VERSION"));

    let pool = store::create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;
    store::run_migrations(&pool).await?;

    let cache = RedisCache::connect(RedisConfig {
        url: config.redis.url.clone(),
        ..Default::default()
    })
    .await?;

    let store: Arc<dyn EntityStore> = Arc::new(PgStore::new(pool.clone()));
    let cache: Arc<dyn Cache> = Arc::new(cache);
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher);

    let tokens = TokenService::new(
        config.auth.jwt_secret.as_str(),
        chrono::Duration::seconds(config.auth.token_ttl_secs as i64),
    );
    let gate = Arc::new(AuthorizationGate::new(tokens.clone()));

    let cache_ttl = Duration::from_secs(config.cache.ttl_secs);
    let directory = Arc::new(UserDirectory::new(
        store.clone(),
        cache.clone(),
        hasher.clone(),
        cache_ttl,
    ));
    let board = Arc::new(TaskBoard::new(store, cache, directory.clone(), cache_ttl));

    let state = AppState {
        db: pool,
        directory,
        board,
        hasher,
        tokens,
        gate,
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received, exiting");
}
