/// Database models and their output-safe views
///
/// - `user`: User account model
/// - `task`: Task model and stage enum

pub mod task;
pub mod user;

pub use task::{NewTask, Stage, Task, TaskId, TaskPatch, TaskView};
pub use user::{NewUser, User, UserId, UserView};
