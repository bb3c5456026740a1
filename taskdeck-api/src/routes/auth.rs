/// Authentication endpoints
///
/// # Endpoints
///
/// - `GET /v1/auth/user/:username` - Look up a user
/// - `POST /v1/auth/signup` - Create an account, returns a token
/// - `POST /v1/auth/signin` - Verify credentials, returns a token
/// - `DELETE /v1/auth/deleteuser` - Delete the token's own account
///
/// Signup and signin hand back `{ token, user }` with a sanitized user;
/// the password hash never crosses this boundary. Deletion is gated: the
/// account deleted is the one embedded in the token, regardless of what
/// the request body claims.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use taskdeck_shared::auth::{PasswordHasher as _, TokenBearer};
use taskdeck_shared::models::UserView;

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 20, message = "Username must be 3 to 20 characters long"))]
    pub username: String,

    #[validate(length(min = 6, max = 30, message = "Password must be 6 to 30 characters long"))]
    pub password: String,
}

/// Signin request
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub username: String,
    pub password: String,
}

/// Token plus sanitized account, returned by signup and signin
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}

/// Single-user response envelope
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserView,
}

/// Gated deletion request; `username` is stamped by the gate
#[derive(Debug, Deserialize)]
pub struct DeleteUserRequest {
    pub token: Option<String>,

    #[serde(default)]
    pub username: Option<String>,
}

impl TokenBearer for DeleteUserRequest {
    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn set_username(&mut self, username: String) {
        self.username = Some(username);
    }
}

/// `GET /v1/auth/user/:username`
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .directory
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::NotFound("No user with that username exists".to_string()))?;

    Ok(Json(UserResponse { user: user.view() }))
}

/// `POST /v1/auth/signup`
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> ApiResult<Json<AuthResponse>> {
    payload.validate()?;

    // duplicate check ordered here, ahead of the expensive hash
    if state
        .directory
        .find_by_username(&payload.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "A user with this username already exists".to_string(),
        ));
    }

    let user = state
        .directory
        .create_user(&payload.username, &payload.password)
        .await?;

    let token = state
        .tokens
        .sign(user.id, &user.username)
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    Ok(Json(AuthResponse {
        token,
        user: user.view(),
    }))
}

/// `POST /v1/auth/signin`
///
/// Unknown username and wrong password are indistinguishable to the
/// caller.
pub async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<SigninRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = state
        .directory
        .find_by_username(&payload.username)
        .await?
        .ok_or_else(invalid_credentials)?;

    let verified = state
        .hasher
        .verify(&payload.password, &user.password_hash)
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    if !verified {
        return Err(invalid_credentials());
    }

    let token = state
        .tokens
        .sign(user.id, &user.username)
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    Ok(Json(AuthResponse {
        token,
        user: user.view(),
    }))
}

/// `DELETE /v1/auth/deleteuser`
pub async fn delete_user(
    State(state): State<AppState>,
    Json(mut payload): Json<DeleteUserRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let identity = state.gate.authorize(&mut payload)?;

    if state
        .directory
        .find_by_username(&identity.username)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound(
            "There is no user bound to this token".to_string(),
        ));
    }

    state
        .directory
        .delete_user(&identity.username, &state.board)
        .await?;

    Ok(Json(serde_json::json!({})))
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid username or password".to_string())
}
