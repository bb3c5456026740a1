/// Cache-aside coordinators for the two entity kinds
///
/// [`UserDirectory`] owns the `user:<username>` entries and
/// [`TaskBoard`] owns the `task:<id>` entries. The two caches reference
/// each other: a cached task embeds a sanitized owner snapshot, and a
/// cached user can go stale whenever one of its tasks changes. Keeping
/// them coherent is an explicit, synchronous cascade between the two
/// coordinators, never an accidental ordering of statements:
///
/// - every task mutation (create, update, delete) invalidates the
///   owner's `user:` entry;
/// - deleting a user invalidates its own entry and then delegates
///   per-task invalidation to the board before the durable row goes.
///
/// The documented ordering contract for deletes is **cache first, then
/// the durable row**. A partial failure therefore leaves an empty cache
/// and a live row, which the next read simply repopulates; the system
/// never trades that for a stale entry pointing at dead data.
///
/// Cache operations are best-effort throughout: a failing cache degrades
/// every path to direct store reads and is logged, never surfaced.

pub mod board;
pub mod directory;

pub use board::TaskBoard;
pub use directory::UserDirectory;

use crate::models::TaskId;

pub(crate) fn user_key(username: &str) -> String {
    format!("user:{username}")
}

pub(crate) fn task_key(id: TaskId) -> String {
    format!("task:{id}")
}
