/**
 * Sync Event System
 *
 * This module defines the events the sync service broadcasts to consumers
 * that cache a derived view of the task list (for example an in-memory
 * board model or a connectivity indicator).
 */
use crate::shared::task::Task;
use serde::{Deserialize, Serialize};

/// Event broadcast by the sync service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SyncEvent {
    /// A reconciliation pass completed; carries the merged task set now
    /// held by the local replica
    TasksSynced(Vec<Task>),
    /// The background probe observed a change in server reachability
    ConnectivityChanged(bool),
}

impl SyncEvent {
    /// Merged tasks if this is a completion event
    pub fn synced_tasks(&self) -> Option<&[Task]> {
        match self {
            SyncEvent::TasksSynced(tasks) => Some(tasks),
            SyncEvent::ConnectivityChanged(_) => None,
        }
    }
}
