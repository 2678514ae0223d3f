//! Error types for Judge Core.
//!
//! `JudgeError` maps cleanly to HTTP responses. The upstream error types
//! (`BackendError`, `EmbeddingError`, `ClassificationError`) never reach a
//! response directly: they are resolved per model at the point of origin.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Unified error type for request-level failures.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure of a single generation backend.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    #[error("HTTP Error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Timed out after {after:?}")]
    TimedOut { after: std::time::Duration },

    #[error("Backend task aborted: {0}")]
    Aborted(String),
}

/// Failure to obtain or compare embeddings.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EmbeddingError {
    #[error("Embedding request failed: {0}")]
    Request(String),

    #[error("Malformed embedding response: {0}")]
    Malformed(String),

    #[error("Degenerate embedding (zero vector)")]
    Degenerate,

    #[error("Embedding dimensions differ: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
}

/// Failure of the toxicity classifier.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClassificationError {
    #[error("Classification request failed: {0}")]
    Request(String),

    #[error("Malformed classification response: {0}")]
    Malformed(String),
}

/// Error response body for API clients.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for JudgeError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            JudgeError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            JudgeError::Storage(msg) => {
                tracing::error!(error = %msg, "Storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "StorageError",
                    "Storage unavailable".to_string(),
                    Some(msg.clone()),
                )
            }
            JudgeError::Config(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                "Configuration error".to_string(),
                Some(msg.clone()),
            ),
            JudgeError::Serialization(e) => (
                StatusCode::BAD_REQUEST,
                "SERIALIZATION_ERROR",
                "Failed to process request/response".to_string(),
                Some(e.to_string()),
            ),
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for Judge operations.
pub type JudgeResult<T> = Result<T, JudgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_storage_error_is_server_error() {
        let response = JudgeError::Storage("lock poisoned".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "StorageError");
        assert_eq!(body["error"], "Storage unavailable");
        assert_eq!(body["details"], "lock poisoned");
    }

    #[test]
    fn test_bad_request_status() {
        let response = JudgeError::BadRequest("missing model".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_backend_error_messages() {
        let err = BackendError::Status {
            status: 503,
            body: "loading".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP Error 503: loading");
        assert_eq!(
            BackendError::TimedOut {
                after: std::time::Duration::from_secs(30)
            }
            .to_string(),
            "Timed out after 30s"
        );
    }
}
