//! Judge Core - LLM response comparison service
//!
//! Sends one prompt to several hosted models, scores their answers on
//! correctness, toxicity, hallucination risk, readability and length,
//! and keeps rolling per-model analytics plus human feedback.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

mod api;
mod config;
mod domain;
mod engine;
mod error;
mod logging;
mod storage;

use crate::api::build_router;
use crate::config::Config;
use crate::domain::TimeRange;
use crate::engine::{
    build_backends, FleschScorer, HttpEmbeddingSource, HttpToxicitySource, InferenceClient,
    MetricEvaluator, ModelOrchestrator,
};
use crate::storage::{AnalyticsStore, FeedbackStore};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Prompt fan-out across the configured backends.
    pub orchestrator: Arc<ModelOrchestrator>,
    /// Metric scoring.
    pub evaluator: Arc<MetricEvaluator>,
    /// Evaluation log.
    pub analytics: Arc<AnalyticsStore>,
    /// Human ratings.
    pub feedback: Arc<FeedbackStore>,
    /// Window used when a request does not name one.
    pub default_window: TimeRange,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is expected in production
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: No .env file loaded ({e})");
    }

    logging::init();

    tracing::info!("Starting Judge Core v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        anyhow::anyhow!("Configuration error: {}", e)
    })?;
    config.validate().map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        anyhow::anyhow!("{}", e)
    })?;
    let default_window = config.analytics.window()?;

    if config.inference.api_token.is_empty() {
        tracing::warn!("No inference API token configured - hosted endpoints may reject requests");
    }

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        backends = config.backends.len(),
        timeout_secs = config.inference.timeout_secs,
        default_window = %config.analytics.default_window,
        "Configuration loaded"
    );

    let timeout = Duration::from_secs(config.inference.timeout_secs);
    let client = InferenceClient::new(config.inference.api_token.clone(), timeout)?;

    let orchestrator = Arc::new(ModelOrchestrator::new(
        build_backends(&config.backends, &client)?,
        timeout,
    )?);

    let evaluator = Arc::new(MetricEvaluator::new(
        Arc::new(HttpEmbeddingSource::new(
            config.metrics.embedding_url.clone(),
            client.clone(),
        )),
        Arc::new(HttpToxicitySource::new(
            config.metrics.toxicity_url.clone(),
            client,
        )),
        Arc::new(FleschScorer),
        config.metrics.readability_neutral,
    ));

    let state = AppState {
        orchestrator,
        evaluator,
        analytics: Arc::new(AnalyticsStore::new()),
        feedback: Arc::new(FeedbackStore::new()),
        default_window,
    };

    let app = build_router(state, &config.server.cors_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(address = %addr, "Server listening");
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
