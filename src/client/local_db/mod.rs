//! # Local Replica Module
//!
//! This module provides the durable, process-local copy of the task board
//! that makes offline-first operation possible.
//!
//! ## Architecture
//!
//! The replica is two JSON documents on top of a [`KeyValueStore`]:
//! - **Task set** (`kanban-tasks`): array of every task known locally
//! - **Pending deletes** (`kanban-pending-deletes`): identities whose server
//!   deletion has not been confirmed yet
//!
//! The replica is the source of truth for task fields. Reading never fails:
//! a missing or corrupt document reads as empty and is logged. Every write is
//! durable before it returns.
//!
//! ## Key Components
//!
//! - `LocalReplica`: task set operations and identity promotion
//! - `kv.rs`: the key-value durability interface and its implementations
//! - `pending.rs`: pending-delete set operations
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskboard_sync::client::local_db::{LocalReplica, SqliteStore};
//! use taskboard_sync::shared::{Task, TaskFields};
//!
//! # async fn example() -> Result<(), taskboard_sync::client::StorageError> {
//! let store = SqliteStore::open("/tmp/taskboard").await?;
//! let replica = LocalReplica::new(Arc::new(store));
//! replica.insert(Task::new(5, TaskFields::new("Ship it"))).await?;
//! assert!(replica.get(&"5".into()).await.is_some());
//! # Ok(())
//! # }
//! ```

pub mod kv;
pub mod pending;

pub use kv::{KeyValueStore, MemoryStore, SqliteStore};

use crate::client::error::StorageError;
use crate::shared::{Task, TaskId};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::sync::Arc;

/// Storage key of the task set
pub const TASKS_KEY: &str = "kanban-tasks";
/// Storage key of the pending-delete set
pub const PENDING_DELETES_KEY: &str = "kanban-pending-deletes";

/// Result type for local replica writes
pub type Result<T> = std::result::Result<T, StorageError>;

/// Durable local copy of the task board
///
/// Not internally synchronized beyond what the backing store provides;
/// callers that read-modify-write must hold exclusive access (the sync
/// engine keeps the replica behind a single async mutex).
#[derive(Clone)]
pub struct LocalReplica {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for LocalReplica {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalReplica").finish_non_exhaustive()
    }
}

impl LocalReplica {
    /// Open a replica on top of a key-value store
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Every task stored locally
    ///
    /// Returns an empty list when nothing was stored yet or the stored
    /// document cannot be parsed.
    pub async fn load(&self) -> Vec<Task> {
        self.read_list(TASKS_KEY).await
    }

    /// Atomically replace the whole task set
    ///
    /// Later duplicates of an identity already in `tasks` are dropped so the
    /// stored set never holds the same identity twice.
    pub async fn save(&self, tasks: &[Task]) -> Result<()> {
        let mut seen = HashSet::with_capacity(tasks.len());
        let mut unique = Vec::with_capacity(tasks.len());
        for task in tasks {
            if seen.insert(task.id.clone()) {
                unique.push(task);
            } else {
                tracing::warn!("Dropping duplicate local task {}", task.id);
            }
        }
        self.write_list(TASKS_KEY, &unique).await
    }

    /// Look up a task by identity (string-normalized comparison)
    pub async fn get(&self, id: &TaskId) -> Option<Task> {
        self.load().await.into_iter().find(|task| task.id == *id)
    }

    /// Store a task, replacing any task with the same identity in place
    pub async fn insert(&self, task: Task) -> Result<()> {
        let mut tasks = self.load().await;
        match tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => *existing = task,
            None => tasks.push(task),
        }
        self.save(&tasks).await
    }

    /// Overwrite an existing task; returns `false` if it is not stored
    pub async fn replace(&self, task: Task) -> Result<bool> {
        let mut tasks = self.load().await;
        let Some(existing) = tasks.iter_mut().find(|existing| existing.id == task.id) else {
            return Ok(false);
        };
        *existing = task;
        self.save(&tasks).await?;
        Ok(true)
    }

    /// Remove a task, returning it if it was stored
    pub async fn remove(&self, id: &TaskId) -> Result<Option<Task>> {
        let mut tasks = self.load().await;
        let Some(index) = tasks.iter().position(|task| task.id == *id) else {
            return Ok(None);
        };
        let removed = tasks.remove(index);
        self.save(&tasks).await?;
        Ok(Some(removed))
    }

    /// Re-key a stored task to the identity the server assigned
    ///
    /// The entry under `from` is replaced by `task` at the same position in
    /// one save, so no reader ever sees both identities or neither. `from`
    /// is then dropped from the pending-delete set. Returns `false` when no
    /// task is stored under `from`.
    pub async fn promote(&self, from: &TaskId, task: Task) -> Result<bool> {
        let mut tasks = self.load().await;
        if !tasks.iter().any(|existing| existing.id == *from) {
            return Ok(false);
        }
        // A stale copy already under the new identity would collide
        tasks.retain(|existing| existing.id != task.id || existing.id == *from);
        if let Some(slot) = tasks.iter_mut().find(|existing| existing.id == *from) {
            *slot = task;
        }
        self.save(&tasks).await?;
        self.remove_pending_delete(from).await?;
        Ok(true)
    }

    async fn read_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let bytes = match self.store.load(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read {} from local store: {}", key, e);
                return Vec::new();
            }
        };

        let items = match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(serde_json::Value::Array(items)) => items,
            Ok(_) => {
                tracing::warn!("Local {} is not an array; treating as empty", key);
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!("Local {} is corrupt; treating as empty: {}", key, e);
                return Vec::new();
            }
        };

        items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("Skipping malformed entry in local {}: {}", key, e);
                    None
                }
            })
            .collect()
    }

    async fn write_list<T: serde::Serialize + Sync>(&self, key: &str, items: &[T]) -> Result<()> {
        let bytes = serde_json::to_vec(items)?;
        self.store.save(key, &bytes).await.map_err(|e| {
            tracing::error!("Failed to persist {}: {}", key, e);
            e
        })
    }
}
