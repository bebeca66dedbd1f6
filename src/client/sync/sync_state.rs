//! # Sync State
//!
//! Snapshot of the sync service for a status indicator.
//!
//! ## Features
//!
//! - **Reachability**: last probe result and when it ran
//! - **Pass Tracking**: whether a pass is running and how the last one ended
//! - **Backlog**: pending deletes and temporary tasks awaiting the server

use serde::{Deserialize, Serialize};

/// How the most recent reconciliation pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassOutcome {
    Synchronized,
    Offline,
    Aborted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    /// Whether the last probe reached the server
    pub is_connected: bool,
    /// RFC3339 time of the last probe
    pub last_checked: Option<String>,
    /// Whether a reconciliation pass is running
    pub is_syncing: bool,
    /// RFC3339 time of the last successful pass
    pub last_sync: Option<String>,
    /// Outcome of the most recent pass
    pub last_outcome: Option<PassOutcome>,
    /// Why the most recent pass aborted, if it did
    pub last_error: Option<String>,
    /// Identities still waiting for server deletion
    pub pending_deletes: usize,
    /// Tasks still holding a temporary identity
    pub temporary_tasks: usize,
}

impl SyncState {
    /// Whether local changes are still waiting for the server
    pub fn has_backlog(&self) -> bool {
        self.pending_deletes > 0 || self.temporary_tasks > 0
    }
}
