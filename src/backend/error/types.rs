/**
 * Backend Error Types
 *
 * This module defines the errors returned by the reference task server's
 * HTTP handlers. Every variant maps to one HTTP status code.
 *
 * # Error Types
 *
 * - `NotFound` - the addressed task does not exist (404)
 * - `BadRequest` - the request body is not a JSON object (400)
 * - `SerializationError` - a stored record could not be encoded (500)
 */

use axum::http::StatusCode;
use thiserror::Error;

/// Reference server error types
///
/// # Usage
///
/// ```rust
/// use taskboard_sync::backend::error::ApiError;
///
/// let err = ApiError::not_found("12");
/// assert_eq!(err.status_code().as_u16(), 404);
/// ```
#[derive(Debug, Error)]
pub enum ApiError {
    /// No task is stored under the requested identity
    #[error("Task {id} not found")]
    NotFound {
        /// Identity from the request path
        id: String,
    },

    /// The request could not be processed as sent
    #[error("Bad request: {message}")]
    BadRequest {
        /// Human-readable error message
        message: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl ApiError {
    /// Create a new not-found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a new bad-request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `NotFound` - 404 Not Found
    /// - `BadRequest` - 400 Bad Request
    /// - `SerializationError` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        self.to_string()
    }
}
