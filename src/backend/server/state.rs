/**
 * Application State Management
 *
 * The state shared by every request handler of the reference task server.
 *
 * # Thread Safety
 *
 * The task table sits behind `Arc<RwLock<TaskStore>>`: list and get take the
 * read lock, create, patch and delete take the write lock.
 *
 * # State Extraction
 *
 * The `FromRef` implementation lets handlers extract the task table alone
 * without the whole `AppState`.
 */

use crate::backend::tasks::TaskStore;
use axum::extract::FromRef;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state shared across handlers
#[derive(Clone, Debug, Default)]
pub struct AppState {
    /// In-memory task table
    pub tasks: Arc<RwLock<TaskStore>>,
}

impl AppState {
    pub fn new(store: TaskStore) -> Self {
        Self {
            tasks: Arc::new(RwLock::new(store)),
        }
    }
}

impl FromRef<AppState> for Arc<RwLock<TaskStore>> {
    fn from_ref(state: &AppState) -> Self {
        state.tasks.clone()
    }
}
