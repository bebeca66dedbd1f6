//! # State Reconciliation
//!
//! Brings the local replica and the task server back in line after a period
//! offline. Runs at startup and whenever the server becomes reachable again.
//!
//! ## Pass Structure
//!
//! Each step finishes before the next one starts:
//!
//! 1. **Drain pending deletes**: delete each pending identity on the server
//!    if it is still there, then forget it. Transport failures keep it queued.
//! 2. **Promote temporary tasks**: create each temporary task on the server
//!    and re-key it locally to the server's id.
//! 3. **Push local state**: `PATCH` every permanent task with its full local
//!    record, creating (and re-keying) it when the server does not know it.
//! 4. **Pull and merge**: fetch the server list and add the tasks the
//!    replica lacks, skipping identities that were pending deletion.
//! 5. Persist the merge and broadcast `SyncEvent::TasksSynced`.
//!
//! Per-task failures in steps 1-3 are logged and retried on the next pass.
//! A failed pull aborts the pass without touching the merged state.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use taskboard_sync::client::offline::ReconciliationResult;
//!
//! # async fn example(engine: taskboard_sync::client::offline::ReconciliationEngine) {
//! match engine.reconcile().await {
//!     ReconciliationResult::Synchronized(report) => println!("{} tasks", report.tasks.len()),
//!     ReconciliationResult::Offline(_) => println!("server unreachable, skipped"),
//!     ReconciliationResult::Aborted { reason, .. } => println!("aborted: {}", reason),
//! }
//! # }
//! ```

use crate::client::api::TaskServer;
use crate::client::error::{ServerError, StorageError};
use crate::client::local_db::LocalReplica;
use crate::client::sync::conflict_resolver::merge_local_wins;
use crate::client::sync::network_monitor::ConnectivityProber;
use crate::shared::{SyncEvent, Task, TaskId};
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};

/// Counters and final state of a completed pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Merged task set now held by the local replica
    pub tasks: Vec<Task>,
    /// Pending deletes confirmed and dropped from the set
    pub deletes_confirmed: usize,
    /// Pending deletes kept for the next pass
    pub deletes_deferred: usize,
    /// Temporary tasks promoted to server identities
    pub promoted: usize,
    /// Permanent tasks pushed to the server (updated or re-created)
    pub pushed: usize,
    /// Creates or pushes that failed and were left for the next pass
    pub failed: usize,
    /// Server tasks added to the replica by the merge
    pub pulled: usize,
}

/// Outcome of [`ReconciliationEngine::reconcile`]
#[derive(Debug, Clone, PartialEq)]
pub enum ReconciliationResult {
    /// The pass completed and the merge was persisted
    Synchronized(ReconciliationReport),
    /// The server was unreachable; the local state is unchanged
    Offline(Vec<Task>),
    /// The pass stopped early; `tasks` is the local state as it stands
    Aborted { tasks: Vec<Task>, reason: String },
}

impl ReconciliationResult {
    /// Local task set after the pass
    pub fn tasks(&self) -> &[Task] {
        match self {
            ReconciliationResult::Synchronized(report) => &report.tasks,
            ReconciliationResult::Offline(tasks) => tasks,
            ReconciliationResult::Aborted { tasks, .. } => tasks,
        }
    }

    pub fn is_synchronized(&self) -> bool {
        matches!(self, ReconciliationResult::Synchronized(_))
    }
}

#[derive(Debug, Error)]
enum PassError {
    #[error("fetching server tasks failed: {0}")]
    Pull(#[from] ServerError),
    #[error("local store write failed: {0}")]
    Storage(#[from] StorageError),
}

/// How the server ended up holding a pushed task
enum Pushed {
    Updated,
    Recreated(Task),
}

/// Batch reconciliation between the local replica and the task server
#[derive(Clone)]
pub struct ReconciliationEngine {
    replica: Arc<Mutex<LocalReplica>>,
    server: Arc<dyn TaskServer>,
    prober: Arc<ConnectivityProber>,
    events: broadcast::Sender<SyncEvent>,
    max_concurrent_requests: usize,
}

impl std::fmt::Debug for ReconciliationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconciliationEngine")
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .finish_non_exhaustive()
    }
}

impl ReconciliationEngine {
    pub fn new(
        replica: Arc<Mutex<LocalReplica>>,
        server: Arc<dyn TaskServer>,
        prober: Arc<ConnectivityProber>,
        events: broadcast::Sender<SyncEvent>,
        max_concurrent_requests: usize,
    ) -> Self {
        Self {
            replica,
            server,
            prober,
            events,
            max_concurrent_requests: max_concurrent_requests.max(1),
        }
    }

    /// Run one full pass
    ///
    /// Holds the replica lock for the whole pass, so record operations and
    /// other passes wait for it to finish.
    pub async fn reconcile(&self) -> ReconciliationResult {
        let replica = self.replica.lock().await;

        if !self.prober.probe().await {
            tracing::info!("Server unreachable; skipping reconciliation");
            return ReconciliationResult::Offline(replica.load().await);
        }

        tracing::info!("Starting reconciliation pass");
        match self.run_pass(&replica).await {
            Ok(report) => {
                tracing::info!(
                    "Reconciliation complete: {} tasks, {} deletes confirmed, {} promoted, {} pushed, {} pulled, {} failed",
                    report.tasks.len(),
                    report.deletes_confirmed,
                    report.promoted,
                    report.pushed,
                    report.pulled,
                    report.failed
                );
                // No subscribers is fine
                let _ = self.events.send(SyncEvent::TasksSynced(report.tasks.clone()));
                ReconciliationResult::Synchronized(report)
            }
            Err(e) => {
                tracing::warn!("Reconciliation aborted: {}", e);
                ReconciliationResult::Aborted {
                    tasks: replica.load().await,
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn run_pass(&self, replica: &LocalReplica) -> Result<ReconciliationReport, PassError> {
        let mut report = ReconciliationReport::default();

        let pending = replica.list_pending_deletes().await;
        let excluded: HashSet<TaskId> = pending.iter().cloned().collect();

        self.drain_pending_deletes(replica, pending, &mut report).await?;
        self.promote_temporary(replica, &mut report).await?;
        self.push_local(replica, &mut report).await?;

        let server_tasks = self.server.list_tasks().await?;
        let local = replica.load().await;
        let local_count = local.len();
        let merged = merge_local_wins(local, server_tasks, &excluded);
        report.pulled = merged.len() - local_count;

        replica.save(&merged).await?;
        report.tasks = merged;
        Ok(report)
    }

    async fn drain_pending_deletes(
        &self,
        replica: &LocalReplica,
        pending: Vec<TaskId>,
        report: &mut ReconciliationReport,
    ) -> Result<(), StorageError> {
        let server = Arc::clone(&self.server);
        let outcomes: Vec<(TaskId, Result<(), ServerError>)> = stream::iter(pending)
            .map(|id| {
                let server = Arc::clone(&server);
                async move {
                    let outcome = delete_if_present(server.as_ref(), &id).await;
                    (id, outcome)
                }
            })
            .buffer_unordered(self.max_concurrent_requests)
            .collect()
            .await;

        for (id, outcome) in outcomes {
            match outcome {
                Ok(()) => {
                    replica.remove_pending_delete(&id).await?;
                    report.deletes_confirmed += 1;
                }
                Err(e) => {
                    tracing::warn!("Keeping task {} pending deletion: {}", id, e);
                    report.deletes_deferred += 1;
                }
            }
        }
        Ok(())
    }

    async fn promote_temporary(
        &self,
        replica: &LocalReplica,
        report: &mut ReconciliationReport,
    ) -> Result<(), StorageError> {
        let temporary: Vec<Task> = replica
            .load()
            .await
            .into_iter()
            .filter(|task| task.id.is_temporary())
            .collect();

        let server = Arc::clone(&self.server);
        let outcomes: Vec<(Task, Result<Task, ServerError>)> = stream::iter(temporary)
            .map(|task| {
                let server = Arc::clone(&server);
                async move {
                    let outcome = server.create_task(&task.fields).await;
                    (task, outcome)
                }
            })
            .buffer_unordered(self.max_concurrent_requests)
            .collect()
            .await;

        for (task, outcome) in outcomes {
            match outcome {
                Ok(created) => {
                    let promoted = task.rekeyed(created.id);
                    tracing::debug!("Promoted task {} to {}", task.id, promoted.id);
                    replica.promote(&task.id, promoted).await?;
                    report.promoted += 1;
                }
                Err(e) => {
                    tracing::warn!("Promoting task {} failed: {}", task.id, e);
                    report.failed += 1;
                }
            }
        }
        Ok(())
    }

    async fn push_local(
        &self,
        replica: &LocalReplica,
        report: &mut ReconciliationReport,
    ) -> Result<(), StorageError> {
        let permanent: Vec<Task> = replica
            .load()
            .await
            .into_iter()
            .filter(|task| !task.id.is_temporary())
            .collect();

        let server = Arc::clone(&self.server);
        let outcomes: Vec<(Task, Result<Pushed, ServerError>)> = stream::iter(permanent)
            .map(|task| {
                let server = Arc::clone(&server);
                async move {
                    let outcome = push_one(server.as_ref(), &task).await;
                    (task, outcome)
                }
            })
            .buffer_unordered(self.max_concurrent_requests)
            .collect()
            .await;

        for (task, outcome) in outcomes {
            match outcome {
                Ok(Pushed::Updated) => report.pushed += 1,
                Ok(Pushed::Recreated(created)) => {
                    if created.id != task.id {
                        let promoted = task.rekeyed(created.id);
                        tracing::debug!("Re-created task {} on server as {}", task.id, promoted.id);
                        replica.promote(&task.id, promoted).await?;
                    }
                    report.pushed += 1;
                }
                Err(e) => {
                    tracing::warn!("Pushing task {} failed: {}", task.id, e);
                    report.failed += 1;
                }
            }
        }
        Ok(())
    }
}

/// Delete `id` on the server if the server still has it
async fn delete_if_present(server: &dyn TaskServer, id: &TaskId) -> Result<(), ServerError> {
    if id.is_temporary() {
        return Ok(());
    }
    if server.task_exists(id).await? {
        server.delete_task(id).await?;
        tracing::debug!("Deleted task {} on server", id);
    } else {
        tracing::debug!("Task {} was never on server or already gone", id);
    }
    Ok(())
}

/// Full-record update, falling back to a create when the server lost the task
async fn push_one(server: &dyn TaskServer, task: &Task) -> Result<Pushed, ServerError> {
    match server.update_task(&task.id, &task.fields).await {
        Ok(_) => Ok(Pushed::Updated),
        Err(ServerError::NotFound { .. }) => {
            let created = server.create_task(&task.fields).await?;
            Ok(Pushed::Recreated(created))
        }
        Err(e) => Err(e),
    }
}
