//! # Task Server Client
//!
//! The REST surface the sync engine consumes, expressed as the
//! [`TaskServer`] trait, and its reqwest implementation.
//!
//! ## Endpoints
//!
//! - `GET /tasks` - full replica pull (also used as the connectivity probe)
//! - `GET /tasks/{id}` - existence probe, 404 when unknown
//! - `POST /tasks` - create; the server assigns the identity
//! - `PATCH /tasks/{id}` - update; 404 means "does not exist yet"
//! - `DELETE /tasks/{id}` - delete; 404 counts as already deleted
//!
//! Every call is a single attempt bounded by the configured request timeout.
//! Retrying is the reconciliation engine's job, not the transport's.

use crate::client::config::Config;
use crate::client::error::ServerError;
use crate::shared::{Task, TaskFields, TaskId};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};

/// Contract of the authoritative task server
#[async_trait]
pub trait TaskServer: Send + Sync {
    /// Fetch every task the server holds
    async fn list_tasks(&self) -> Result<Vec<Task>, ServerError>;

    /// Fetch one task; `ServerError::NotFound` when unknown
    async fn fetch_task(&self, id: &TaskId) -> Result<Task, ServerError>;

    /// Create a task from its fields; the returned task carries the
    /// server-assigned identity
    async fn create_task(&self, fields: &TaskFields) -> Result<Task, ServerError>;

    /// Overwrite a task's fields; `ServerError::NotFound` when unknown
    async fn update_task(&self, id: &TaskId, fields: &TaskFields) -> Result<Task, ServerError>;

    /// Delete a task; succeeds when the task is already gone
    async fn delete_task(&self, id: &TaskId) -> Result<(), ServerError>;

    /// Whether the server currently knows `id`
    async fn task_exists(&self, id: &TaskId) -> Result<bool, ServerError> {
        match self.fetch_task(id).await {
            Ok(_) => Ok(true),
            Err(ServerError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Reachability check; every failure maps to `false`
    async fn ping(&self) -> bool {
        self.list_tasks().await.is_ok()
    }
}

/// reqwest-backed [`TaskServer`]
#[derive(Debug, Clone)]
pub struct HttpTaskServer {
    config: Config,
    client: Client,
}

impl HttpTaskServer {
    /// Create a client whose every request is bounded by the configured timeout
    pub fn new(config: Config) -> Result<Self, ServerError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.request_timeout())
            .build()?;
        Ok(Self { config, client })
    }

    fn tasks_url(&self) -> Result<Url, ServerError> {
        Url::parse(&self.config.api_url("/tasks"))
            .map_err(|e| ServerError::transport(format!("invalid server URL: {}", e)))
    }

    fn task_url(&self, id: &TaskId) -> Result<Url, ServerError> {
        let mut url = self.tasks_url()?;
        url.path_segments_mut()
            .map_err(|_| ServerError::transport("server URL cannot carry a path"))?
            .push(&id.as_key());
        Ok(url)
    }

    /// Map a response status into the error taxonomy
    fn check_status(response: Response, id: Option<&TaskId>) -> Result<Response, ServerError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(ServerError::NotFound { id: id.clone() });
            }
        }
        if !status.is_success() {
            return Err(ServerError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl TaskServer for HttpTaskServer {
    async fn list_tasks(&self) -> Result<Vec<Task>, ServerError> {
        let response = self.client.get(self.tasks_url()?).send().await?;
        let body: serde_json::Value = Self::check_status(response, None)?.json().await?;

        let serde_json::Value::Array(items) = body else {
            tracing::warn!("GET /tasks did not return an array; treating as empty");
            return Ok(Vec::new());
        };

        let mut tasks = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<Task>(item) {
                Ok(task) => tasks.push(task),
                Err(e) => tracing::warn!("Skipping malformed task from server: {}", e),
            }
        }
        Ok(tasks)
    }

    async fn fetch_task(&self, id: &TaskId) -> Result<Task, ServerError> {
        let response = self.client.get(self.task_url(id)?).send().await?;
        Ok(Self::check_status(response, Some(id))?.json().await?)
    }

    async fn create_task(&self, fields: &TaskFields) -> Result<Task, ServerError> {
        let response = self.client.post(self.tasks_url()?).json(fields).send().await?;
        let task: Task = Self::check_status(response, None)?.json().await?;
        tracing::debug!("Server assigned id {} to new task", task.id);
        Ok(task)
    }

    async fn update_task(&self, id: &TaskId, fields: &TaskFields) -> Result<Task, ServerError> {
        let response = self.client.patch(self.task_url(id)?).json(fields).send().await?;
        Ok(Self::check_status(response, Some(id))?.json().await?)
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), ServerError> {
        let response = self.client.delete(self.task_url(id)?).send().await?;
        match Self::check_status(response, Some(id)) {
            Ok(_) => Ok(()),
            Err(ServerError::NotFound { .. }) => {
                tracing::debug!("Task {} was already absent on server", id);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
