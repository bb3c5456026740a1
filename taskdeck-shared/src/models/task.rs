/// Task model, stage enum, and sanitized task view
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_stage AS ENUM ('TODO', 'DOING', 'DONE');
///
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     owner_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     stage task_stage NOT NULL DEFAULT 'TODO',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Ownership is a one-directional `owner_id` reference. The owner's full
/// record is never embedded in a task row or a cached task; [`TaskView`]
/// carries a [`UserView`] snapshot, so a cached task can never expose the
/// owner's password hash.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::user::{UserId, UserView};

/// Store-assigned task identifier
pub type TaskId = i64;

/// Task stage
///
/// Any direct transition between any two stages is permitted; validation
/// only restricts the value to the enum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_stage")]
#[serde(rename_all = "UPPERCASE")]
pub enum Stage {
    #[default]
    #[sqlx(rename = "TODO")]
    Todo,

    #[sqlx(rename = "DOING")]
    Doing,

    #[sqlx(rename = "DONE")]
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Todo => "TODO",
            Stage::Doing => "DOING",
            Stage::Done => "DONE",
        }
    }
}

/// Task row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (BIGSERIAL)
    pub id: TaskId,

    /// Owning user; task rows cascade when the owner is deleted
    pub owner_id: UserId,

    /// Task name, at most 255 characters
    pub name: String,

    /// Current stage
    pub stage: Stage,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated; strictly increases on every update
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Stamps `updated_at` with the current time, keeping it strictly
    /// increasing even when two updates land inside the clock's
    /// resolution.
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::milliseconds(1)
        };
    }

    /// Combines this task with a sanitized owner snapshot
    pub fn into_view(self, owner: UserView) -> TaskView {
        TaskView {
            id: self.id,
            name: self.name,
            stage: self.stage,
            created_at: self.created_at,
            updated_at: self.updated_at,
            owner,
        }
    }
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub owner_id: UserId,
    pub name: String,
    pub stage: Stage,
}

/// Partial update: absent fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub stage: Option<Stage>,
}

impl TaskPatch {
    pub fn apply(&self, task: &mut Task) {
        if let Some(name) = &self.name {
            task.name = name.clone();
        }
        if let Some(stage) = self.stage {
            task.stage = stage;
        }
    }
}

/// Client-facing task representation with an embedded owner snapshot
///
/// This is what `TaskBoard` caches and returns. The embedded snapshot is
/// exactly why the `user:` cache entry is invalidated on every task
/// mutation, and why the `task:` entries are invalidated when the owner
/// changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskView {
    pub id: TaskId,
    pub name: String,
    pub stage: Stage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: UserView,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        let now = Utc::now();
        Task {
            id: 7,
            owner_id: 1,
            name: "Write spec".to_string(),
            stage: Stage::Todo,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_stage_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Stage::Todo).unwrap(), "\"TODO\"");
        assert_eq!(serde_json::to_string(&Stage::Doing).unwrap(), "\"DOING\"");
        assert_eq!(serde_json::to_string(&Stage::Done).unwrap(), "\"DONE\"");
    }

    #[test]
    fn test_stage_rejects_unknown_values() {
        assert!(serde_json::from_str::<Stage>("\"BLOCKED\"").is_err());
        assert!(serde_json::from_str::<Stage>("\"todo\"").is_err());
    }

    #[test]
    fn test_stage_defaults_to_todo() {
        assert_eq!(Stage::default(), Stage::Todo);
    }

    #[test]
    fn test_touch_is_strictly_monotonic() {
        let mut task = sample_task();
        let before = task.updated_at;

        task.touch();
        let first = task.updated_at;
        task.touch();
        let second = task.updated_at;

        assert!(first > before);
        assert!(second > first);
    }

    #[test]
    fn test_touch_advances_past_a_future_timestamp() {
        // updated_at ahead of the wall clock still moves forward
        let mut task = sample_task();
        task.updated_at = Utc::now() + Duration::seconds(30);
        let before = task.updated_at;

        task.touch();

        assert!(task.updated_at > before);
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let mut task = sample_task();
        let patch = TaskPatch {
            name: None,
            stage: Some(Stage::Done),
        };

        patch.apply(&mut task);

        assert_eq!(task.name, "Write spec");
        assert_eq!(task.stage, Stage::Done);
    }

    #[test]
    fn test_view_embeds_owner_without_password() {
        let task = sample_task();
        let owner = UserView {
            id: 1,
            username: "alice".to_string(),
            created_at: Utc::now(),
        };

        let view = task.into_view(owner);
        let json = serde_json::to_string(&view).unwrap();

        assert!(json.contains("\"alice\""));
        assert!(!json.contains("password"));
    }
}
