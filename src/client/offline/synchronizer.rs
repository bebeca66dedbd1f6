//! # Record Synchronizer
//!
//! Single-record create, update and delete. Every operation writes through
//! the local replica first, so callers never wait on the network for
//! durability, then makes at most one opportunistic server call.
//!
//! ## Features
//!
//! - **Create**: server-assigned id when reachable, temporary id otherwise
//! - **Update**: local patch, then a full-record `PATCH`; a 404 applies the
//!   configured [`MissingOnServer`] policy
//! - **Delete**: immediate local removal; unconfirmed server deletes land in
//!   the pending-delete set
//!
//! Each operation holds the replica lock from its first read to its last
//! write, so operations on the same replica never interleave.

use crate::client::api::TaskServer;
use crate::client::error::{ServerError, SyncError};
use crate::client::local_db::LocalReplica;
use crate::client::offline::identity::allocate_temporary;
use crate::client::offline::Confirmation;
use crate::client::sync::network_monitor::ConnectivityProber;
use crate::shared::{MissingOnServer, Task, TaskFields, TaskId, TaskPatch};
use std::sync::Arc;
use tokio::sync::Mutex;

const SERVER_UNREACHABLE: &str = "server unreachable";

/// Offline-first record operations over a shared local replica
#[derive(Clone)]
pub struct TaskSynchronizer {
    replica: Arc<Mutex<LocalReplica>>,
    server: Arc<dyn TaskServer>,
    prober: Arc<ConnectivityProber>,
    missing_on_server: MissingOnServer,
}

impl std::fmt::Debug for TaskSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskSynchronizer")
            .field("missing_on_server", &self.missing_on_server)
            .finish_non_exhaustive()
    }
}

impl TaskSynchronizer {
    pub fn new(
        replica: Arc<Mutex<LocalReplica>>,
        server: Arc<dyn TaskServer>,
        prober: Arc<ConnectivityProber>,
        missing_on_server: MissingOnServer,
    ) -> Self {
        Self {
            replica,
            server,
            prober,
            missing_on_server,
        }
    }

    /// Every task in the local replica
    pub async fn tasks(&self) -> Vec<Task> {
        self.replica.lock().await.load().await
    }

    /// One task from the local replica
    pub async fn get(&self, id: &TaskId) -> Option<Task> {
        self.replica.lock().await.get(id).await
    }

    /// Create a task, best effort
    pub async fn create(&self, fields: TaskFields) -> Result<Task, SyncError> {
        self.create_with(fields, Confirmation::BestEffort).await
    }

    /// Create a task
    ///
    /// When the server accepts it the task is stored under the server's id.
    /// Otherwise it is stored under a fresh temporary id and promoted by the
    /// next reconciliation pass.
    pub async fn create_with(
        &self,
        mut fields: TaskFields,
        confirmation: Confirmation,
    ) -> Result<Task, SyncError> {
        fields.touch();
        let replica = self.replica.lock().await;

        let reason = if self.prober.probe().await {
            match self.server.create_task(&fields).await {
                Ok(created) => {
                    let task = Task::new(created.id, fields);
                    replica.insert(task.clone()).await?;
                    tracing::debug!("Created task {} on server", task.id);
                    return Ok(task);
                }
                Err(e) => {
                    tracing::warn!("Server create failed, keeping task locally: {}", e);
                    e.to_string()
                }
            }
        } else {
            SERVER_UNREACHABLE.to_string()
        };

        let task = Task::new(allocate_temporary(), fields);
        replica.insert(task.clone()).await?;
        tracing::debug!("Stored task {} locally until the server is reachable", task.id);
        confirmation.settle(&task.id, reason)?;
        Ok(task)
    }

    /// Update a task, best effort
    pub async fn update(&self, id: &TaskId, patch: TaskPatch) -> Result<Task, SyncError> {
        self.update_with(id, patch, Confirmation::BestEffort).await
    }

    /// Apply `patch` to a stored task and push the full record
    ///
    /// Returns the task as stored afterwards. Its identity only differs
    /// from `id` when the server had lost the task and the
    /// [`MissingOnServer::Recreate`] policy re-created it.
    pub async fn update_with(
        &self,
        id: &TaskId,
        patch: TaskPatch,
        confirmation: Confirmation,
    ) -> Result<Task, SyncError> {
        let replica = self.replica.lock().await;
        let Some(mut task) = replica.get(id).await else {
            return Err(SyncError::NotFound { id: id.clone() });
        };

        patch.apply_to(&mut task.fields);
        task.fields.touch();
        replica.replace(task.clone()).await?;

        if task.id.is_temporary() {
            tracing::debug!("Task {} is not on the server yet; update kept locally", task.id);
            confirmation.settle(&task.id, "task has not reached the server yet")?;
            return Ok(task);
        }

        if !self.prober.probe().await {
            confirmation.settle(&task.id, SERVER_UNREACHABLE)?;
            return Ok(task);
        }

        match self.server.update_task(&task.id, &task.fields).await {
            Ok(_) => {
                tracing::debug!("Updated task {} on server", task.id);
                Ok(task)
            }
            Err(ServerError::NotFound { .. }) => {
                self.handle_missing_on_server(&replica, task, confirmation).await
            }
            Err(e) => {
                tracing::warn!("Server update of task {} failed: {}", task.id, e);
                confirmation.settle(&task.id, e.to_string())?;
                Ok(task)
            }
        }
    }

    async fn handle_missing_on_server(
        &self,
        replica: &LocalReplica,
        task: Task,
        confirmation: Confirmation,
    ) -> Result<Task, SyncError> {
        match self.missing_on_server {
            MissingOnServer::Defer => {
                tracing::debug!("Task {} missing on server; deferring to reconciliation", task.id);
                confirmation.settle(&task.id, "task missing on server")?;
                Ok(task)
            }
            MissingOnServer::Recreate => match self.server.create_task(&task.fields).await {
                Ok(created) => {
                    let promoted = task.rekeyed(created.id);
                    replica.promote(&task.id, promoted.clone()).await?;
                    tracing::info!("Re-created task {} on server as {}", task.id, promoted.id);
                    Ok(promoted)
                }
                Err(e) => {
                    tracing::warn!("Re-creating task {} on server failed: {}", task.id, e);
                    confirmation.settle(&task.id, e.to_string())?;
                    Ok(task)
                }
            },
        }
    }

    /// Delete a task, best effort
    pub async fn delete(&self, id: &TaskId) -> Result<(), SyncError> {
        self.delete_with(id, Confirmation::BestEffort).await
    }

    /// Remove a task locally and from the server
    ///
    /// Temporary tasks never reached the server and are only removed
    /// locally. A permanent task whose server delete is not confirmed is
    /// queued in the pending-delete set.
    pub async fn delete_with(&self, id: &TaskId, confirmation: Confirmation) -> Result<(), SyncError> {
        let replica = self.replica.lock().await;
        let Some(removed) = replica.remove(id).await? else {
            return Err(SyncError::NotFound { id: id.clone() });
        };

        if removed.id.is_temporary() {
            tracing::debug!("Deleted local-only task {}", removed.id);
            return Ok(());
        }

        let reason = if self.prober.probe().await {
            match self.server.delete_task(&removed.id).await {
                Ok(()) => {
                    tracing::debug!("Deleted task {} on server", removed.id);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Server delete of task {} failed: {}", removed.id, e);
                    e.to_string()
                }
            }
        } else {
            SERVER_UNREACHABLE.to_string()
        };

        replica.add_pending_delete(&removed.id).await?;
        confirmation.settle(&removed.id, reason)
    }
}
