//! Generation-related domain types.
//!
//! Represents what a single backend produced for a prompt.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::BackendError;

/// Outcome of one backend call: generated text or an error, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ModelResult {
    /// The backend produced text.
    Text { model_name: String, text: String },
    /// The backend failed, timed out, or was aborted.
    Error { model_name: String, error: String },
}

impl ModelResult {
    /// Build a result from a backend outcome.
    pub fn from_outcome(model_name: impl Into<String>, outcome: Result<String, BackendError>) -> Self {
        let model_name = model_name.into();
        match outcome {
            Ok(text) => ModelResult::Text { model_name, text },
            Err(e) => ModelResult::Error {
                model_name,
                error: e.to_string(),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ModelResult::Error { .. })
    }

    /// The string shown to clients: generated text, or the error description.
    pub fn into_display_text(self) -> String {
        match self {
            ModelResult::Text { text, .. } => text,
            ModelResult::Error { error, .. } => error,
        }
    }
}
