//! # Conflict Resolution
//!
//! Merges the local replica with the server's task list after a push.
//!
//! The local replica is authoritative for every task it holds: a task present
//! on both sides keeps its local fields untouched. The server only
//! contributes tasks the replica has never seen, and never contributes a task
//! whose deletion was still pending when the pass started.

use crate::shared::{Task, TaskId};
use std::collections::HashSet;

/// Merge `server` into `local`, local wins
///
/// The result holds every local task in its local order, followed by each
/// server task whose identity is neither local nor in `pending_deletes`, in
/// server order. Duplicate identities in the server list are collapsed to
/// their first occurrence.
pub fn merge_local_wins(
    local: Vec<Task>,
    server: Vec<Task>,
    pending_deletes: &HashSet<TaskId>,
) -> Vec<Task> {
    let mut seen: HashSet<TaskId> = local.iter().map(|task| task.id.clone()).collect();
    let mut merged = local;

    for task in server {
        if pending_deletes.contains(&task.id) {
            tracing::debug!("Not resurrecting task {} pending deletion", task.id);
            continue;
        }
        if seen.insert(task.id.clone()) {
            merged.push(task);
        }
    }
    merged
}
