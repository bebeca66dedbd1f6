/**
 * Task API Routes
 *
 * Registers the `/tasks` REST surface on a router.
 */

use crate::backend::server::state::AppState;
use crate::backend::tasks::handlers::{create_task, delete_task, get_task, list_tasks, update_task};
use axum::{routing::get, Router};

/// Add the `/tasks` routes to `router`
pub fn configure_task_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).patch(update_task).delete(delete_task),
        )
}
