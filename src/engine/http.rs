//! Shared HTTP client for hosted inference endpoints.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::{BackendError, ClassificationError, EmbeddingError};

/// Why a call to an inference endpoint did not yield a JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpFailure {
    /// The endpoint answered with a non-2xx status.
    Status { status: u16, body: String },
    /// Connection, TLS, or timeout failure.
    Transport(String),
    /// The body was not valid JSON.
    Decode(String),
}

/// Bearer-authenticated JSON client shared by backends and metric sources.
#[derive(Clone)]
pub struct InferenceClient {
    client: Client,
    api_token: String,
}

impl InferenceClient {
    /// Create a client whose requests give up after `timeout`.
    pub fn new(api_token: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_token: api_token.into(),
        })
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<Value, HttpFailure> {
        let mut request = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body);
        if !self.api_token.is_empty() {
            request = request.bearer_auth(&self.api_token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HttpFailure::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(HttpFailure::Status { status, body });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| HttpFailure::Decode(e.to_string()))
    }
}

impl From<HttpFailure> for BackendError {
    fn from(failure: HttpFailure) -> Self {
        match failure {
            HttpFailure::Status { status, body } => BackendError::Status { status, body },
            HttpFailure::Transport(msg) => BackendError::Transport(msg),
            HttpFailure::Decode(msg) => BackendError::Malformed(msg),
        }
    }
}

impl From<HttpFailure> for EmbeddingError {
    fn from(failure: HttpFailure) -> Self {
        match failure {
            HttpFailure::Status { status, body } => {
                EmbeddingError::Request(format!("HTTP {}: {}", status, body))
            }
            HttpFailure::Transport(msg) => EmbeddingError::Request(msg),
            HttpFailure::Decode(msg) => EmbeddingError::Malformed(msg),
        }
    }
}

impl From<HttpFailure> for ClassificationError {
    fn from(failure: HttpFailure) -> Self {
        match failure {
            HttpFailure::Status { status, body } => {
                ClassificationError::Request(format!("HTTP {}: {}", status, body))
            }
            HttpFailure::Transport(msg) => ClassificationError::Request(msg),
            HttpFailure::Decode(msg) => ClassificationError::Malformed(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_failure_keeps_body_for_backends() {
        let err: BackendError = HttpFailure::Status {
            status: 429,
            body: "rate limited".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "HTTP Error 429: rate limited");
    }

    #[test]
    fn test_decode_failure_is_malformed() {
        let err: EmbeddingError = HttpFailure::Decode("eof".to_string()).into();
        assert!(matches!(err, EmbeddingError::Malformed(_)));
    }
}
