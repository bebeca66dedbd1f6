/**
 * Router Configuration
 *
 * Assembles the reference task server's routes and middleware.
 *
 * # Routes
 *
 * - `GET /tasks`, `POST /tasks`
 * - `GET /tasks/{id}`, `PATCH /tasks/{id}`, `DELETE /tasks/{id}`
 *
 * Every request is traced through `tower_http::trace::TraceLayer`. Unknown
 * routes fall back to a JSON 404.
 */

use crate::backend::error::ApiError;
use crate::backend::routes::api_routes::configure_task_routes;
use crate::backend::server::state::AppState;
use axum::{http::Uri, Router};
use tower_http::trace::TraceLayer;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    configure_task_routes(Router::new())
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn fallback(uri: Uri) -> ApiError {
    ApiError::not_found(uri.path())
}
