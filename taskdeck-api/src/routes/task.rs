/// Task endpoints
///
/// # Endpoints
///
/// - `GET /v1/task/:id` - Look up a task
/// - `POST /v1/task` - Create a task for the token's user
/// - `PATCH /v1/task/:id` - Partial update, owner only
/// - `DELETE /v1/task/:id` - Delete, owner only
///
/// Mutations carry a token in the body; the gate resolves the identity
/// and the handler checks ownership against it after the gate succeeds.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use taskdeck_shared::auth::TokenBearer;
use taskdeck_shared::models::{Stage, TaskId, TaskPatch, TaskView};

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

/// Single-task response envelope
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task: TaskView,
}

/// Task creation request; `username` is stamped by the gate
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    pub token: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Name cannot exceed 255 characters"))]
    pub name: String,

    #[serde(default)]
    pub stage: Option<Stage>,

    #[serde(default)]
    pub username: Option<String>,
}

impl TokenBearer for CreateTaskRequest {
    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn set_username(&mut self, username: String) {
        self.username = Some(username);
    }
}

/// Partial task update request; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    pub token: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Name cannot exceed 255 characters"))]
    pub name: Option<String>,

    #[serde(default)]
    pub stage: Option<Stage>,

    #[serde(default)]
    pub username: Option<String>,
}

impl TokenBearer for UpdateTaskRequest {
    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn set_username(&mut self, username: String) {
        self.username = Some(username);
    }
}

/// Task deletion request
#[derive(Debug, Deserialize)]
pub struct DeleteTaskRequest {
    pub token: Option<String>,

    #[serde(default)]
    pub username: Option<String>,
}

impl TokenBearer for DeleteTaskRequest {
    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn set_username(&mut self, username: String) {
        self.username = Some(username);
    }
}

/// `GET /v1/task/:id`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state
        .board
        .find_by_id(id)
        .await?
        .ok_or_else(task_not_found)?;

    Ok(Json(TaskResponse { task }))
}

/// `POST /v1/task`
pub async fn create(
    State(state): State<AppState>,
    Json(mut payload): Json<CreateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    payload.validate()?;
    let identity = state.gate.authorize(&mut payload)?;

    let task = state
        .board
        .create_task(
            &identity.username,
            payload.name,
            payload.stage.unwrap_or_default(),
        )
        .await?;

    Ok(Json(TaskResponse { task }))
}

/// `PATCH /v1/task/:id`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    Json(mut payload): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    payload.validate()?;
    let identity = state.gate.authorize(&mut payload)?;

    let existing = state
        .board
        .find_by_id(id)
        .await?
        .ok_or_else(task_not_found)?;

    if existing.owner.username != identity.username {
        return Err(ApiError::Forbidden(
            "You are not authorized to edit this task".to_string(),
        ));
    }

    let task = state
        .board
        .update_task(
            id,
            TaskPatch {
                name: payload.name,
                stage: payload.stage,
            },
        )
        .await?;

    Ok(Json(TaskResponse { task }))
}

/// `DELETE /v1/task/:id`
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    Json(mut payload): Json<DeleteTaskRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let identity = state.gate.authorize(&mut payload)?;

    let existing = state
        .board
        .find_by_id(id)
        .await?
        .ok_or_else(task_not_found)?;

    if existing.owner.username != identity.username {
        return Err(ApiError::Forbidden(
            "You are not authorized to delete this task".to_string(),
        ));
    }

    state.board.delete_task(id).await?;

    Ok(Json(serde_json::json!({})))
}

fn task_not_found() -> ApiError {
    ApiError::NotFound("No task with that ID exists".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let ok = CreateTaskRequest {
            token: Some("t".to_string()),
            name: "Write spec".to_string(),
            stage: None,
            username: None,
        };
        assert!(ok.validate().is_ok());

        let too_long = CreateTaskRequest {
            token: Some("t".to_string()),
            name: "x".repeat(256),
            stage: None,
            username: None,
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_update_request_allows_absent_fields() {
        let payload = UpdateTaskRequest {
            token: Some("t".to_string()),
            name: None,
            stage: None,
            username: None,
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_stage_deserializes_from_request_json() {
        let payload: CreateTaskRequest = serde_json::from_str(
            r#"{"token": "t", "name": "Write spec", "stage": "DOING"}"#,
        )
        .unwrap();
        assert_eq!(payload.stage, Some(Stage::Doing));
    }
}
