//! # Pending Deletes
//!
//! The durable set of identities whose deletion has not been confirmed by
//! the server: tasks deleted while offline, or whose server-side delete
//! failed. An identity leaves the set only when the server confirms the
//! deletion or shows the task never existed there.
//!
//! Every operation is idempotent and persisted before it returns.

use super::{LocalReplica, Result, PENDING_DELETES_KEY};
use crate::shared::TaskId;

impl LocalReplica {
    /// Identities awaiting server deletion, in the order they were added
    pub async fn list_pending_deletes(&self) -> Vec<TaskId> {
        let mut pending: Vec<TaskId> = self.read_list(PENDING_DELETES_KEY).await;
        let mut seen = std::collections::HashSet::new();
        pending.retain(|id| seen.insert(id.clone()));
        pending
    }

    /// Whether `id` is waiting for server deletion
    pub async fn is_pending_delete(&self, id: &TaskId) -> bool {
        self.list_pending_deletes().await.contains(id)
    }

    /// Record that `id` still has to be deleted on the server
    pub async fn add_pending_delete(&self, id: &TaskId) -> Result<()> {
        let mut pending = self.list_pending_deletes().await;
        if pending.contains(id) {
            return Ok(());
        }
        pending.push(id.clone());
        tracing::debug!("Queued task {} for server deletion", id);
        self.write_list(PENDING_DELETES_KEY, &pending).await
    }

    /// Forget `id` once its server deletion is confirmed
    pub async fn remove_pending_delete(&self, id: &TaskId) -> Result<()> {
        let mut pending = self.list_pending_deletes().await;
        let before = pending.len();
        pending.retain(|existing| existing != id);
        if pending.len() == before {
            return Ok(());
        }
        self.write_list(PENDING_DELETES_KEY, &pending).await
    }
}
