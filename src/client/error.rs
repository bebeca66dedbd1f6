//! Client Error Types
//!
//! Error taxonomy for the sync client.
//!
//! # Error Categories
//!
//! - `ServerError` - one attempted call to the task server failed
//! - `StorageError` - the local durable store could not be written or read
//! - `SyncError` - what record operations surface to their callers
//!
//! Transport failures are never fatal to the engine: a `ServerError` other
//! than `NotFound` simply means "server unavailable for this call". Callers
//! only see a transport failure when they explicitly ask for confirmation of
//! server durability.

use crate::shared::TaskId;
use thiserror::Error;

/// Failure of a single call to the task server
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServerError {
    /// The server does not know this task
    #[error("task {id} not found on server")]
    NotFound {
        /// Identity that was looked up
        id: TaskId,
    },

    /// The call exceeded the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Connection refused, reset, DNS failure and similar
    #[error("transport error: {message}")]
    Transport {
        /// Human-readable error message
        message: String,
    },

    /// The server answered with a non-success status
    #[error("server responded with status {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The response body could not be decoded
    #[error("invalid response body: {message}")]
    Decode {
        /// Human-readable error message
        message: String,
    },
}

impl ServerError {
    /// Create a new transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Whether the server positively reported the task as unknown
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServerError::NotFound { .. })
    }
}

impl From<reqwest::Error> for ServerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServerError::Timeout
        } else if err.is_decode() {
            ServerError::Decode {
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            ServerError::Status {
                status: status.as_u16(),
            }
        } else {
            ServerError::transport(err.to_string())
        }
    }
}

/// Failure of the local durable store
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The local database rejected a query
    #[error("local database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A value could not be serialized for storage
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing store is unusable (e.g. a poisoned lock)
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human-readable error message
        message: String,
    },
}

/// Errors surfaced by record operations and the sync service
#[derive(Debug, Error)]
pub enum SyncError {
    /// The target task does not exist in the local replica
    #[error("task {id} not found locally")]
    NotFound {
        /// Identity that was looked up
        id: TaskId,
    },

    /// The server did not confirm the operation
    ///
    /// Only returned under `Confirmation::Required`. The local write has
    /// already happened; `id` is the identity the task is stored under.
    #[error("server did not confirm operation on task {id}: {reason}")]
    TransportFailure {
        /// Identity the task is durably stored under locally
        id: TaskId,
        /// Why the server call did not happen or failed
        reason: String,
    },

    /// The local durable write failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The background service was started twice
    #[error("sync service is already running")]
    AlreadyRunning,

    /// The service could not be assembled from its configuration
    #[error("failed to initialize sync service: {message}")]
    Initialization {
        /// Human-readable error message
        message: String,
    },
}

impl SyncError {
    /// Create a new transport failure
    pub fn transport_failure(id: TaskId, reason: impl Into<String>) -> Self {
        Self::TransportFailure {
            id,
            reason: reason.into(),
        }
    }
}
