/// Application state and router builder
///
/// # Routes
///
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// └── /v1/
///     ├── /auth/
///     │   ├── GET    /user/:username
///     │   ├── POST   /signup
///     │   ├── POST   /signin
///     │   └── DELETE /deleteuser    # token-gated
///     └── /task/
///         ├── POST   /              # token-gated
///         └── /:id   GET | PATCH | DELETE  # mutations token-gated
/// ```

use axum::{
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use taskdeck_shared::auth::{AuthorizationGate, PasswordHasher, TokenService};
use taskdeck_shared::coordinator::{TaskBoard, UserDirectory};

use crate::routes;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; every
/// field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (health checks)
    pub db: PgPool,

    /// Cache-aside coordinator for users
    pub directory: Arc<UserDirectory>,

    /// Cache-aside coordinator for tasks
    pub board: Arc<TaskBoard>,

    /// Password hashing capability (signin verification)
    pub hasher: Arc<dyn PasswordHasher>,

    /// Token signing (signup/signin responses)
    pub tokens: TokenService,

    /// Token verification for gated routes
    pub gate: Arc<AuthorizationGate>,
}

/// Builds the Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/user/:username", get(routes::auth::get_user))
        .route("/signup", post(routes::auth::signup))
        .route("/signin", post(routes::auth::signin))
        .route("/deleteuser", delete(routes::auth::delete_user));

    let task_routes = Router::new()
        .route("/", post(routes::task::create))
        .route(
            "/:id",
            get(routes::task::get)
                .patch(routes::task::update)
                .delete(routes::task::delete),
        );

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/v1/auth", auth_routes)
        .nest("/v1/task", task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
