//! # Offline Task Operations
//!
//! Offline-first create/update/delete for task records, plus the batch
//! reconciliation that brings the local replica and the server back in line
//! once connectivity returns.
//!
//! ## Architecture
//!
//! The offline system consists of:
//! - **Identity Allocation**: temporary ids for tasks the server has not seen
//! - **Record Synchronizer**: write-through to the local replica, then one
//!   opportunistic server call per operation
//! - **Reconciliation**: drain pending deletes, promote temporary tasks,
//!   push local state, pull and merge (local wins)
//!
//! ## Key Components
//!
//! - `identity.rs`: temporary identity allocation
//! - `synchronizer.rs`: per-record operations
//! - `reconciliation.rs`: the reconciliation pass
//!
//! ## Usage
//!
//! ```rust,no_run
//! use taskboard_sync::client::offline::Confirmation;
//! use taskboard_sync::shared::{TaskFields, TaskPatch};
//!
//! # async fn example(sync: taskboard_sync::client::offline::TaskSynchronizer) -> Result<(), taskboard_sync::client::error::SyncError> {
//! // Returns immediately with a temporary id when the server is down
//! let task = sync.create(TaskFields::new("Write release notes")).await?;
//!
//! // Fails with TransportFailure unless the server confirmed the write
//! sync.update_with(&task.id, TaskPatch::title("Release notes"), Confirmation::Required)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod identity;
pub mod reconciliation;
pub mod synchronizer;

// Re-export main types
pub use identity::{allocate_temporary, is_temporary};
pub use reconciliation::{ReconciliationEngine, ReconciliationReport, ReconciliationResult};
pub use synchronizer::TaskSynchronizer;

use crate::client::error::SyncError;
use crate::shared::TaskId;
use serde::{Deserialize, Serialize};

/// How much server durability a record operation must confirm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confirmation {
    /// Local durability is enough; server failures are absorbed and left
    /// for reconciliation
    #[default]
    BestEffort,
    /// The server must acknowledge the operation, otherwise the caller gets
    /// `SyncError::TransportFailure` (the local write still happened)
    Required,
}

impl Confirmation {
    /// Turn an unconfirmed server outcome into the caller-visible result
    pub(crate) fn settle(self, id: &TaskId, reason: impl Into<String>) -> Result<(), SyncError> {
        match self {
            Confirmation::BestEffort => Ok(()),
            Confirmation::Required => Err(SyncError::transport_failure(id.clone(), reason)),
        }
    }
}
