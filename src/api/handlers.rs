//! HTTP request handlers.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::api::types::*;
use crate::domain::{
    AnalyticsSummary, FeedbackEntry, FeedbackSubmission, MetricScores, NewEvaluation, TimeRange,
};
use crate::error::{JudgeError, JudgeResult};
use crate::AppState;

/// Send a prompt to every configured backend.
///
/// POST /generate
#[utoipa::path(
    post,
    path = "/generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated text or an error description per model", body = BTreeMap<String, String>)
    ),
    tag = "generation"
)]
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Json<BTreeMap<String, String>> {
    tracing::info!(prompt_chars = request.prompt.len(), "Generating responses");

    let results = state.orchestrator.generate(&request.prompt).await;

    Json(
        results
            .into_iter()
            .map(|(model, result)| (model, result.into_display_text()))
            .collect(),
    )
}

/// Toxicity per model.
///
/// POST /evaluate_safety
#[utoipa::path(
    post,
    path = "/evaluate_safety",
    request_body = ResponsesRequest,
    responses(
        (status = 200, description = "Toxicity in [0,1] per model", body = BTreeMap<String, f64>)
    ),
    tag = "evaluation"
)]
pub async fn evaluate_safety(
    State(state): State<AppState>,
    Json(request): Json<ResponsesRequest>,
) -> Json<BTreeMap<String, f64>> {
    Json(state.evaluator.safety(&request.responses).await)
}

/// Readability per model.
///
/// POST /evaluate_readability
#[utoipa::path(
    post,
    path = "/evaluate_readability",
    request_body = ResponsesRequest,
    responses(
        (status = 200, description = "Readability in [0,1] per model", body = BTreeMap<String, f64>)
    ),
    tag = "evaluation"
)]
pub async fn evaluate_readability(
    State(state): State<AppState>,
    Json(request): Json<ResponsesRequest>,
) -> Json<BTreeMap<String, f64>> {
    Json(state.evaluator.readability(&request.responses))
}

/// Semantic similarity to the reference per model.
///
/// POST /evaluate_correctness
#[utoipa::path(
    post,
    path = "/evaluate_correctness",
    request_body = ReferencedResponsesRequest,
    responses(
        (status = 200, description = "Cosine similarity or null per model", body = BTreeMap<String, Option<f64>>)
    ),
    tag = "evaluation"
)]
pub async fn evaluate_correctness(
    State(state): State<AppState>,
    Json(request): Json<ReferencedResponsesRequest>,
) -> Json<BTreeMap<String, Option<f64>>> {
    Json(
        state
            .evaluator
            .correctness(&request.responses, &request.references)
            .await,
    )
}

/// Hallucination risk per model.
///
/// POST /evaluate_hallucination
#[utoipa::path(
    post,
    path = "/evaluate_hallucination",
    request_body = ReferencedResponsesRequest,
    responses(
        (status = 200, description = "1 - similarity or null per model", body = BTreeMap<String, Option<f64>>)
    ),
    tag = "evaluation"
)]
pub async fn evaluate_hallucination(
    State(state): State<AppState>,
    Json(request): Json<ReferencedResponsesRequest>,
) -> Json<BTreeMap<String, Option<f64>>> {
    Json(
        state
            .evaluator
            .hallucination(&request.responses, &request.references)
            .await,
    )
}

/// Length score per model.
///
/// POST /evaluate_length
#[utoipa::path(
    post,
    path = "/evaluate_length",
    request_body = ResponsesRequest,
    responses(
        (status = 200, description = "Length in [0,1] per model", body = BTreeMap<String, f64>)
    ),
    tag = "evaluation"
)]
pub async fn evaluate_length(
    State(state): State<AppState>,
    Json(request): Json<ResponsesRequest>,
) -> Json<BTreeMap<String, f64>> {
    Json(state.evaluator.length(&request.responses))
}

/// All five metrics per model in one call.
///
/// POST /evaluate
#[utoipa::path(
    post,
    path = "/evaluate",
    request_body = ReferencedResponsesRequest,
    responses(
        (status = 200, description = "Scores per model", body = BTreeMap<String, MetricScores>)
    ),
    tag = "evaluation"
)]
pub async fn evaluate_all(
    State(state): State<AppState>,
    Json(request): Json<ReferencedResponsesRequest>,
) -> Json<BTreeMap<String, MetricScores>> {
    Json(
        state
            .evaluator
            .evaluate_all(&request.responses, &request.references)
            .await,
    )
}

/// Append an evaluation record to the analytics log.
///
/// POST /store_evaluation
#[utoipa::path(
    post,
    path = "/store_evaluation",
    request_body = NewEvaluation,
    responses(
        (status = 200, description = "Record stored", body = StatusResponse),
        (status = 400, description = "Missing model or non-numeric metric"),
        (status = 500, description = "Storage error")
    ),
    tag = "analytics"
)]
pub async fn store_evaluation(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> JudgeResult<Json<StatusResponse>> {
    let new: NewEvaluation = serde_json::from_value(body)?;
    let record = state.analytics.append(new)?;

    tracing::info!(record_id = %record.id, model = %record.model, "Evaluation stored");

    Ok(Json(StatusResponse::new("success")))
}

fn window_or_default(query: &AnalyticsQuery, default: TimeRange) -> JudgeResult<TimeRange> {
    match &query.window {
        Some(window) => window.parse().map_err(JudgeError::BadRequest),
        None => Ok(default),
    }
}

/// Rolling-window summary for every model.
///
/// GET /analytics
#[utoipa::path(
    get,
    path = "/analytics",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Summary per model", body = BTreeMap<String, AnalyticsSummary>),
        (status = 400, description = "Invalid window")
    ),
    tag = "analytics"
)]
pub async fn get_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> JudgeResult<Json<BTreeMap<String, AnalyticsSummary>>> {
    let window = window_or_default(&query, state.default_window)?;
    Ok(Json(state.analytics.summarize(window)?))
}

/// Rolling-window summary for one model, or `{}` if it has no records.
///
/// GET /analytics/{model}
#[utoipa::path(
    get,
    path = "/analytics/{model}",
    params(
        ("model" = String, Path, description = "Model name"),
        AnalyticsQuery
    ),
    responses(
        (status = 200, description = "Summary, or an empty object", body = AnalyticsSummary),
        (status = 400, description = "Invalid window")
    ),
    tag = "analytics"
)]
pub async fn get_model_analytics(
    State(state): State<AppState>,
    Path(model): Path<String>,
    Query(query): Query<AnalyticsQuery>,
) -> JudgeResult<Json<Value>> {
    let window = window_or_default(&query, state.default_window)?;

    let body = match state.analytics.summarize_one(&model, window)? {
        Some(summary) => serde_json::to_value(summary)?,
        None => Value::Object(Default::default()),
    };

    Ok(Json(body))
}

/// Record a human rating.
///
/// Submissions missing a model or rating are dropped, but still acknowledged.
///
/// POST /feedback
#[utoipa::path(
    post,
    path = "/feedback",
    request_body = FeedbackSubmission,
    responses(
        (status = 200, description = "Feedback accepted", body = StatusResponse),
        (status = 500, description = "Storage error")
    ),
    tag = "feedback"
)]
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> JudgeResult<Json<StatusResponse>> {
    if let Some(entry) = state.feedback.record(FeedbackSubmission::from_json(&body))? {
        tracing::info!(model = %entry.model, rating = entry.rating, "Feedback recorded");
    }

    Ok(Json(StatusResponse::new("feedback_stored")))
}

/// Ratings for one model in submission order.
///
/// GET /feedback/{model}
#[utoipa::path(
    get,
    path = "/feedback/{model}",
    params(
        ("model" = String, Path, description = "Model name")
    ),
    responses(
        (status = 200, description = "Feedback entries", body = Vec<FeedbackEntry>)
    ),
    tag = "feedback"
)]
pub async fn list_feedback(
    State(state): State<AppState>,
    Path(model): Path<String>,
) -> JudgeResult<Json<Vec<FeedbackEntry>>> {
    Ok(Json(state.feedback.list(&model)?))
}

/// Health check endpoint.
///
/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> JudgeResult<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backends: state
            .orchestrator
            .backend_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        evaluations: state.analytics.record_count()?,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
