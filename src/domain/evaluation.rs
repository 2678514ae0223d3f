//! Evaluation-related domain types.
//!
//! Represents the scores a model's response earned, and the stamped
//! record that lands in the analytics log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Scores along the five evaluation axes. `None` means the metric is undefined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MetricScores {
    /// Cosine similarity to the reference answer.
    #[serde(default)]
    pub correctness: Option<f64>,
    /// Highest non-clean toxicity label score, in [0,1].
    #[serde(default)]
    pub toxicity: Option<f64>,
    /// `1 - correctness`.
    #[serde(default)]
    pub hallucination: Option<f64>,
    /// Reading ease divided by 100, in [0,1].
    #[serde(default)]
    pub readability: Option<f64>,
    /// Word count over 100, capped at 1.
    #[serde(default)]
    pub length: Option<f64>,
}

/// An evaluation submitted by a client, before it is timestamped.
///
/// Any extra fields in the submitted record are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewEvaluation {
    /// Model the scores belong to.
    #[serde(default)]
    pub model: String,

    #[serde(flatten)]
    pub scores: MetricScores,
}

impl NewEvaluation {
    pub fn new(model: impl Into<String>, scores: MetricScores) -> Self {
        Self {
            model: model.into(),
            scores,
        }
    }
}

/// An immutable entry in the analytics log.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EvaluationRecord {
    /// Unique identifier for this record.
    pub id: Uuid,

    /// Model the scores belong to.
    pub model: String,

    #[serde(flatten)]
    pub scores: MetricScores,

    /// Assigned by the store at append time.
    pub timestamp: DateTime<Utc>,
}

impl EvaluationRecord {
    /// Stamp a submitted evaluation.
    pub fn stamp(new: NewEvaluation, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            model: new.model,
            scores: new.scores,
            timestamp,
        }
    }
}
