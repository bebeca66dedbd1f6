/**
 * Server Initialization
 *
 * Builds the reference task server's Axum application: an empty in-memory
 * task table wrapped in `AppState`, and the router serving `/tasks`.
 */

use crate::backend::routes::router::create_router;
use crate::backend::server::state::AppState;
use crate::backend::tasks::TaskStore;
use axum::Router;

/// Create the Axum application with an empty task table
pub async fn create_app() -> Router<()> {
    tracing::info!("Initializing reference task server");
    create_app_with_state(AppState::new(TaskStore::new()))
}

/// Create the Axum application around existing state
///
/// Lets tests keep a handle on the task table the server uses.
pub fn create_app_with_state(state: AppState) -> Router<()> {
    create_router(state)
}
