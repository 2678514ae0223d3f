//! Model Orchestrator - fans one prompt out to every configured backend.
//!
//! Each backend runs in its own task under its own timeout. A failing,
//! hanging, or panicking backend only ever produces an error entry for
//! itself; the batch completes once every task has finished or timed out.

use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;

use crate::domain::ModelResult;
use crate::engine::GenerationBackend;
use crate::error::{BackendError, JudgeError, JudgeResult};

/// Run independent fallible tasks concurrently and collect every outcome.
///
/// Each task is spawned separately and cancelled if it exceeds `limit`.
/// A panic or timeout in one task is reported as that task's error and
/// never affects its siblings.
pub async fn fan_out<T, F>(
    tasks: Vec<(String, F)>,
    limit: Duration,
) -> BTreeMap<String, Result<T, BackendError>>
where
    T: Send + 'static,
    F: Future<Output = Result<T, BackendError>> + Send + 'static,
{
    let handles: Vec<_> = tasks
        .into_iter()
        .map(|(key, task)| {
            let handle = tokio::spawn(async move {
                match tokio::time::timeout(limit, task).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(BackendError::TimedOut { after: limit }),
                }
            });
            async move {
                let outcome = match handle.await {
                    Ok(outcome) => outcome,
                    Err(e) => Err(BackendError::Aborted(e.to_string())),
                };
                (key, outcome)
            }
        })
        .collect();

    join_all(handles).await.into_iter().collect()
}

/// Queries every configured backend with the same prompt.
pub struct ModelOrchestrator {
    backends: Vec<Arc<dyn GenerationBackend>>,
    timeout: Duration,
}

impl ModelOrchestrator {
    /// Create an orchestrator. Backend names must be unique.
    pub fn new(backends: Vec<Arc<dyn GenerationBackend>>, timeout: Duration) -> JudgeResult<Self> {
        let mut seen = HashSet::new();
        for backend in &backends {
            if !seen.insert(backend.name().to_string()) {
                return Err(JudgeError::Config(format!(
                    "duplicate backend name '{}'",
                    backend.name()
                )));
            }
        }

        Ok(Self { backends, timeout })
    }

    /// Names of the configured backends, in configuration order.
    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Send `prompt` to every backend concurrently.
    ///
    /// The returned mapping always has one entry per backend.
    pub async fn generate(&self, prompt: &str) -> BTreeMap<String, ModelResult> {
        let tasks = self
            .backends
            .iter()
            .map(|backend| {
                let backend = Arc::clone(backend);
                let prompt = prompt.to_string();
                let name = backend.name().to_string();
                let task = async move {
                    let started = Instant::now();
                    let outcome = backend.generate(&prompt).await;
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    match &outcome {
                        Ok(text) => tracing::debug!(
                            model = %backend.name(),
                            elapsed_ms,
                            chars = text.len(),
                            "Backend responded"
                        ),
                        Err(e) => tracing::warn!(
                            model = %backend.name(),
                            elapsed_ms,
                            error = %e,
                            "Backend failed"
                        ),
                    }
                    outcome
                };
                (name, task)
            })
            .collect();

        let outcomes = fan_out(tasks, self.timeout).await;

        let results: BTreeMap<String, ModelResult> = outcomes
            .into_iter()
            .map(|(name, outcome)| {
                let result = ModelResult::from_outcome(name.clone(), outcome);
                (name, result)
            })
            .collect();

        tracing::info!(
            backends = results.len(),
            failed = results.values().filter(|r| r.is_error()).count(),
            "Generation batch complete"
        );

        results
    }
}
