/**
 * Task REST Handlers
 *
 * Handlers for the `/tasks` surface consumed by the sync client.
 *
 * # Endpoints
 *
 * - `GET /tasks` - every stored task
 * - `POST /tasks` - create; the server assigns the identity (201)
 * - `GET /tasks/{id}` - one task, or 404
 * - `PATCH /tasks/{id}` - merge the JSON object body into the task, or 404
 * - `DELETE /tasks/{id}` - remove the task, or 404
 *
 * Identities are integers. A path segment that is not an integer can never
 * name a stored task and is answered with 404.
 */

use crate::backend::error::ApiError;
use crate::backend::server::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{Map, Value};

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::not_found(raw))
}

fn into_object(body: Value) -> Result<Map<String, Value>, ApiError> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(ApiError::bad_request(format!(
            "expected a JSON object, got {}",
            match other {
                Value::Array(_) => "an array",
                Value::Null => "null",
                _ => "a scalar",
            }
        ))),
    }
}

/// `GET /tasks`
pub async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Value>> {
    Json(state.tasks.read().await.list())
}

/// `GET /tasks/{id}`
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let key = parse_id(&id)?;
    state
        .tasks
        .read()
        .await
        .get(key)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(id))
}

/// `POST /tasks`
pub async fn create_task(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let record = into_object(body)?;
    let created = state.tasks.write().await.create(record);
    tracing::info!("Created task {}", created["id"]);
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PATCH /tasks/{id}`
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let key = parse_id(&id)?;
    let changes = into_object(body)?;
    let updated = state
        .tasks
        .write()
        .await
        .patch(key, changes)
        .ok_or_else(|| ApiError::not_found(id))?;
    tracing::debug!("Updated task {}", key);
    Ok(Json(updated))
}

/// `DELETE /tasks/{id}`
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let key = parse_id(&id)?;
    if !state.tasks.write().await.delete(key) {
        return Err(ApiError::not_found(id));
    }
    tracing::info!("Deleted task {}", key);
    Ok(Json(Value::Object(Map::new())))
}
