//! Route definitions for the API.

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::handlers;
use crate::AppState;

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::generate,
        handlers::evaluate_safety,
        handlers::evaluate_readability,
        handlers::evaluate_correctness,
        handlers::evaluate_hallucination,
        handlers::evaluate_length,
        handlers::evaluate_all,
        handlers::store_evaluation,
        handlers::get_analytics,
        handlers::get_model_analytics,
        handlers::submit_feedback,
        handlers::list_feedback,
        handlers::health_check,
    ),
    components(schemas(
        crate::api::types::GenerateRequest,
        crate::api::types::ResponsesRequest,
        crate::api::types::ReferencedResponsesRequest,
        crate::api::types::StatusResponse,
        crate::api::types::HealthResponse,
        crate::domain::MetricScores,
        crate::domain::NewEvaluation,
        crate::domain::EvaluationRecord,
        crate::domain::AnalyticsSummary,
        crate::domain::TimeRange,
        crate::domain::FeedbackSubmission,
        crate::domain::FeedbackEntry,
        crate::domain::ModelResult,
    )),
    tags(
        (name = "generation", description = "Prompt fan-out to model backends"),
        (name = "evaluation", description = "Per-model response scoring"),
        (name = "analytics", description = "Evaluation log and rolling-window summaries"),
        (name = "feedback", description = "Human ratings"),
        (name = "health", description = "Health and status endpoints")
    ),
    info(
        title = "Judge Core API",
        version = "0.1.0",
        description = "Compares LLM backends on a shared prompt and tracks their scores over time",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// CORS policy: the listed origins, or any origin when the list is empty.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(allowed)
}

/// Build the API router.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        // Generation
        .route("/generate", post(handlers::generate))
        // Evaluation
        .route("/evaluate", post(handlers::evaluate_all))
        .route("/evaluate_safety", post(handlers::evaluate_safety))
        .route("/evaluate_readability", post(handlers::evaluate_readability))
        .route("/evaluate_correctness", post(handlers::evaluate_correctness))
        .route("/evaluate_hallucination", post(handlers::evaluate_hallucination))
        .route("/evaluate_length", post(handlers::evaluate_length))
        // Analytics
        .route("/store_evaluation", post(handlers::store_evaluation))
        .route("/analytics", get(handlers::get_analytics))
        .route("/analytics/{model}", get(handlers::get_model_analytics))
        // Feedback
        .route("/feedback", post(handlers::submit_feedback))
        .route("/feedback/{model}", get(handlers::list_feedback))
        // Health
        .route("/health", get(handlers::health_check))
        .with_state(state)
        // OpenAPI docs
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::domain::TimeRange;
    use crate::engine::{
        EmbeddingSource, FleschScorer, GenerationBackend, LabelScore, MetricEvaluator,
        ModelOrchestrator, ToxicitySource,
    };
    use crate::error::{BackendError, ClassificationError, EmbeddingError};
    use crate::storage::{AnalyticsStore, FeedbackStore};

    struct EchoBackend(&'static str);

    #[async_trait]
    impl GenerationBackend for EchoBackend {
        fn name(&self) -> &str {
            self.0
        }

        async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
            Ok(format!("{} says {}", self.0, prompt))
        }
    }

    struct DownBackend;

    #[async_trait]
    impl GenerationBackend for DownBackend {
        fn name(&self) -> &str {
            "down"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, BackendError> {
            Err(BackendError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })
        }
    }

    struct LengthEmbedder;

    #[async_trait]
    impl EmbeddingSource for LengthEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    struct MildClassifier;

    #[async_trait]
    impl ToxicitySource for MildClassifier {
        async fn classify(&self, _text: &str) -> Result<Vec<LabelScore>, ClassificationError> {
            Ok(vec![LabelScore {
                label: "toxic".to_string(),
                score: 0.25,
            }])
        }
    }

    fn test_state() -> AppState {
        let backends: Vec<Arc<dyn GenerationBackend>> =
            vec![Arc::new(EchoBackend("echo")), Arc::new(DownBackend)];
        AppState {
            orchestrator: Arc::new(
                ModelOrchestrator::new(backends, Duration::from_secs(5)).unwrap(),
            ),
            evaluator: Arc::new(MetricEvaluator::new(
                Arc::new(LengthEmbedder),
                Arc::new(MildClassifier),
                Arc::new(FleschScorer),
                0.5,
            )),
            analytics: Arc::new(AnalyticsStore::new()),
            feedback: Arc::new(FeedbackStore::new()),
            default_window: TimeRange::Last24h,
        }
    }

    fn app(state: AppState) -> Router {
        build_router(state, &[])
    }

    async fn send(
        router: Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(body) => Body::from(body.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_generate_returns_entry_per_backend() {
        let (status, body) = send(
            app(test_state()),
            "POST",
            "/generate",
            Some(json!({"prompt": "hi"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["echo"], "echo says hi");
        assert_eq!(body["down"], "HTTP Error 503: unavailable");
    }

    #[tokio::test]
    async fn test_evaluate_length_and_safety() {
        let state = test_state();
        let request = json!({"responses": {"a": "", "b": "one two"}});

        let (status, body) =
            send(app(state.clone()), "POST", "/evaluate_length", Some(request.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["a"], 0.0);
        assert_eq!(body["b"], 0.02);

        let (_, body) = send(app(state), "POST", "/evaluate_safety", Some(request)).await;
        assert_eq!(body["a"], 0.25);
    }

    #[tokio::test]
    async fn test_correctness_null_without_reference() {
        let (status, body) = send(
            app(test_state()),
            "POST",
            "/evaluate_correctness",
            Some(json!({
                "responses": {"a": "same", "b": "other"},
                "references": {"a": "same"}
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!((body["a"].as_f64().unwrap() - 1.0).abs() < 1e-6);
        assert!(body["b"].is_null());
    }

    #[tokio::test]
    async fn test_store_then_query_analytics() {
        let state = test_state();

        for (correctness, toxicity) in [(0.9, 0.1), (0.5, 0.3)] {
            let (status, body) = send(
                app(state.clone()),
                "POST",
                "/store_evaluation",
                Some(json!({
                    "model": "A",
                    "correctness": correctness,
                    "toxicity": toxicity,
                    "prompt": "ignored"
                })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "success");
        }

        let (status, body) = send(app(state.clone()), "GET", "/analytics", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["A"]["count"], 2);
        assert!((body["A"]["correctness"].as_f64().unwrap() - 0.7).abs() < 1e-9);

        let (_, body) = send(app(state.clone()), "GET", "/analytics/A?window=7d", None).await;
        assert_eq!(body["model"], "A");

        let (status, body) = send(app(state), "GET", "/analytics/unknown", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));
    }

    #[tokio::test]
    async fn test_store_evaluation_validation() {
        let state = test_state();

        let (status, _) = send(
            app(state.clone()),
            "POST",
            "/store_evaluation",
            Some(json!({"correctness": 0.5})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            app(state.clone()),
            "POST",
            "/store_evaluation",
            Some(json!({"model": "A", "correctness": "high"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.analytics.record_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_window_rejected() {
        let (status, body) =
            send(app(test_state()), "GET", "/analytics?window=forever", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_feedback_roundtrip() {
        let state = test_state();

        let (status, body) = send(
            app(state.clone()),
            "POST",
            "/feedback",
            Some(json!({"model": "A", "rating": 5, "comment": "great"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "feedback_stored");

        let (status, body) =
            send(app(state.clone()), "POST", "/feedback", Some(json!({"model": "A"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "feedback_stored");

        let (_, body) = send(app(state), "GET", "/feedback/A", None).await;
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["rating"], 5.0);
        assert_eq!(entries[0]["comment"], "great");
    }

    #[tokio::test]
    async fn test_health_lists_backends() {
        let (status, body) = send(app(test_state()), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        let backends: Vec<_> = body["backends"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b.as_str().unwrap().to_string())
            .collect();
        assert_eq!(backends, vec!["echo", "down"]);
    }

    #[tokio::test]
    async fn test_mistyped_feedback_is_acknowledged_and_dropped() {
        let state = test_state();

        for submission in [
            json!({"model": "A", "rating": "5"}),
            json!({"model": "A", "rating": true}),
            json!({"model": 12, "rating": 4}),
            json!({"model": "A", "rating": 0, "comment": 7}),
            json!("not an object"),
        ] {
            let (status, body) =
                send(app(state.clone()), "POST", "/feedback", Some(submission)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "feedback_stored");
        }

        let (status, body) = send(app(state), "GET", "/feedback/A", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    async fn preflight(cors_origins: &[String], origin: &str) -> Option<String> {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/generate")
            .header("origin", origin)
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();

        let response = build_router(test_state(), cors_origins)
            .oneshot(request)
            .await
            .unwrap();
        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_cors_allows_listed_origin_only() {
        let origins = vec!["http://localhost:3000".to_string()];

        assert_eq!(
            preflight(&origins, "http://localhost:3000").await.as_deref(),
            Some("http://localhost:3000")
        );
        assert_eq!(preflight(&origins, "http://evil.example").await, None);
    }

    #[tokio::test]
    async fn test_cors_without_origin_list_allows_any() {
        assert_eq!(
            preflight(&[], "http://anywhere.example").await.as_deref(),
            Some("*")
        );
    }
}
