//! Human feedback domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// Feedback as submitted by a client. Both `model` and `rating` may be missing.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct FeedbackSubmission {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// A stored human rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeedbackEntry {
    pub id: Uuid,
    pub model: String,
    pub rating: f64,
    pub comment: String,
    pub timestamp: DateTime<Utc>,
}

impl FeedbackSubmission {
    /// Read a submission from an arbitrary JSON body.
    ///
    /// Fields of the wrong type are treated as absent, so a malformed
    /// submission is dropped by `into_entry` instead of failing the request.
    pub fn from_json(body: &Value) -> Self {
        let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            model: text("model"),
            rating: body.get("rating").and_then(Value::as_f64),
            comment: text("comment"),
        }
    }

    /// Validate and stamp the submission.
    ///
    /// Returns `None` when the model is missing or blank, or the rating is
    /// missing or zero.
    pub fn into_entry(self, timestamp: DateTime<Utc>) -> Option<FeedbackEntry> {
        let model = self.model.filter(|m| !m.trim().is_empty())?;
        let rating = self.rating.filter(|r| *r != 0.0 && r.is_finite())?;

        Some(FeedbackEntry {
            id: Uuid::new_v4(),
            model,
            rating,
            comment: self.comment.unwrap_or_default(),
            timestamp,
        })
    }
}
