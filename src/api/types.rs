//! API request and response types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ==================== Generation ====================

/// Request to fan a prompt out to every backend.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateRequest {
    /// Prompt sent unchanged to each backend.
    pub prompt: String,
}

// ==================== Evaluation ====================

/// Responses to score, keyed by model.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResponsesRequest {
    pub responses: BTreeMap<String, String>,
}

/// Responses plus per-model reference answers.
///
/// Models without a non-empty reference score null for correctness and
/// hallucination.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReferencedResponsesRequest {
    pub responses: BTreeMap<String, String>,
    #[serde(default)]
    pub references: BTreeMap<String, String>,
}

/// Generic acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
        }
    }
}

// ==================== Analytics ====================

/// Query parameters for analytics endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalyticsQuery {
    /// Rolling window: 24h, 7d, 30d or 90d.
    #[serde(default)]
    pub window: Option<String>,
}

// ==================== Health ====================

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Configured backend names.
    pub backends: Vec<String>,
    /// Records in the analytics log.
    pub evaluations: usize,
    /// Timestamp.
    pub timestamp: String,
}
