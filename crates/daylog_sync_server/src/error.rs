//! Error types for the entries server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use daylog_storage::StorageError;
use serde_json::json;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the entries server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Invalid id or request body.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No record for the requested id.
    #[error("Entry not found")]
    NotFound(String),

    /// The entry store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O error (binding, serving).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking request task panicked or was cancelled.
    #[error("request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServerError {
    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::InvalidRequest(_) | ServerError::NotFound(_)
        )
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ServerError::Storage(_) | ServerError::Io(_) | ServerError::Task(_)
        )
    }

    /// Returns the HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Storage(_) | ServerError::Io(_) | ServerError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
