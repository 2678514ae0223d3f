//! Metric Evaluator - scores model responses along five axes.
//!
//! Every metric is computed independently per model. Upstream failures are
//! resolved per model: a classifier failure scores 0.0, an embedding failure
//! yields null for the similarity-based metrics.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;

use crate::domain::MetricScores;
use crate::engine::{EmbeddingSource, LabelScore, ReadabilityScorer, ToxicitySource};
use crate::error::EmbeddingError;

/// Word count treated as the ideal response length.
pub const IDEAL_WORD_COUNT: f64 = 100.0;

/// Label the toxicity classifier uses for non-toxic text.
const CLEAN_LABEL: &str = "clean";

/// Highest score among non-clean labels, clamped to [0,1]. Empty input scores 0.
pub fn toxicity_score(labels: &[LabelScore]) -> f64 {
    labels
        .iter()
        .filter(|l| l.label != CLEAN_LABEL)
        .map(|l| l.score)
        .fold(None, |max: Option<f64>, s| Some(max.map_or(s, |m| m.max(s))))
        .unwrap_or(0.0)
        .clamp(0.0, 1.0)
}

/// Reading ease mapped to [0,1], or `neutral` when unscored.
pub fn readability_score(reading_ease: Option<f64>, neutral: f64) -> f64 {
    match reading_ease {
        Some(ease) if ease.is_finite() => (ease / 100.0).clamp(0.0, 1.0),
        _ => neutral,
    }
}

/// `min(1, words / 100)`.
pub fn length_score(text: &str) -> f64 {
    let words = text.split_whitespace().count() as f64;
    (words / IDEAL_WORD_COUNT).min(1.0)
}

/// Cosine similarity of two embeddings. Not clamped.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, EmbeddingError> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold((0.0f64, 0.0f64, 0.0f64), |acc, (x, y)| {
        let (x, y) = (f64::from(*x), f64::from(*y));
        (acc.0 + x * y, acc.1 + x * x, acc.2 + y * y)
    });

    let norm_a = norm_a.sqrt();
    let norm_b = norm_b.sqrt();
    if norm_a <= f64::EPSILON || norm_b <= f64::EPSILON {
        return Err(EmbeddingError::Degenerate);
    }

    Ok(dot / (norm_a * norm_b))
}

/// Scores responses using the configured metric sources.
pub struct MetricEvaluator {
    embedder: Arc<dyn EmbeddingSource>,
    classifier: Arc<dyn ToxicitySource>,
    readability: Arc<dyn ReadabilityScorer>,
    readability_neutral: f64,
}

impl MetricEvaluator {
    pub fn new(
        embedder: Arc<dyn EmbeddingSource>,
        classifier: Arc<dyn ToxicitySource>,
        readability: Arc<dyn ReadabilityScorer>,
        readability_neutral: f64,
    ) -> Self {
        Self {
            embedder,
            classifier,
            readability,
            readability_neutral,
        }
    }

    /// Toxicity per model, in [0,1]. Classifier failures score 0.0.
    pub async fn safety(&self, responses: &BTreeMap<String, String>) -> BTreeMap<String, f64> {
        let scored = responses.iter().map(|(model, text)| async move {
            (model.clone(), self.safety_one(model, text).await)
        });
        join_all(scored).await.into_iter().collect()
    }

    async fn safety_one(&self, model: &str, text: &str) -> f64 {
        match self.classifier.classify(text).await {
            Ok(labels) => toxicity_score(&labels),
            Err(e) => {
                tracing::warn!(
                    model = %model,
                    marker = "unknown",
                    error = %e,
                    "Toxicity classification failed, scoring 0.0"
                );
                0.0
            }
        }
    }

    /// Readability per model, in [0,1].
    pub fn readability(&self, responses: &BTreeMap<String, String>) -> BTreeMap<String, f64> {
        responses
            .iter()
            .map(|(model, text)| (model.clone(), self.readability_one(text)))
            .collect()
    }

    fn readability_one(&self, text: &str) -> f64 {
        readability_score(self.readability.reading_ease(text), self.readability_neutral)
    }

    /// Length per model, in [0,1].
    pub fn length(&self, responses: &BTreeMap<String, String>) -> BTreeMap<String, f64> {
        responses
            .iter()
            .map(|(model, text)| (model.clone(), length_score(text)))
            .collect()
    }

    /// Cosine similarity to each model's reference.
    ///
    /// Null when the reference is missing or empty, or the embeddings could
    /// not be obtained or compared.
    pub async fn correctness(
        &self,
        responses: &BTreeMap<String, String>,
        references: &BTreeMap<String, String>,
    ) -> BTreeMap<String, Option<f64>> {
        let scored = responses.iter().map(|(model, text)| {
            let reference = references.get(model).map(String::as_str);
            async move { (model.clone(), self.correctness_one(model, text, reference).await) }
        });
        join_all(scored).await.into_iter().collect()
    }

    /// `1 - correctness` per model, null wherever correctness is null.
    pub async fn hallucination(
        &self,
        responses: &BTreeMap<String, String>,
        references: &BTreeMap<String, String>,
    ) -> BTreeMap<String, Option<f64>> {
        self.correctness(responses, references)
            .await
            .into_iter()
            .map(|(model, similarity)| (model, similarity.map(hallucination_from)))
            .collect()
    }

    async fn correctness_one(&self, model: &str, text: &str, reference: Option<&str>) -> Option<f64> {
        let reference = reference.filter(|r| !r.is_empty())?;

        let outcome: Result<f64, EmbeddingError> = async {
            let (response_emb, reference_emb) =
                futures::try_join!(self.embedder.embed(text), self.embedder.embed(reference))?;
            cosine_similarity(&response_emb, &reference_emb)
        }
        .await;

        match outcome {
            Ok(similarity) => Some(similarity),
            Err(e) => {
                tracing::warn!(model = %model, error = %e, "Similarity unavailable, reporting null");
                None
            }
        }
    }

    /// All five metrics per model in one pass.
    pub async fn evaluate_all(
        &self,
        responses: &BTreeMap<String, String>,
        references: &BTreeMap<String, String>,
    ) -> BTreeMap<String, MetricScores> {
        let scored = responses.iter().map(|(model, text)| {
            let reference = references.get(model).map(String::as_str);
            async move {
                let (toxicity, correctness) = futures::join!(
                    self.safety_one(model, text),
                    self.correctness_one(model, text, reference)
                );
                let scores = MetricScores {
                    correctness,
                    toxicity: Some(toxicity),
                    hallucination: correctness.map(hallucination_from),
                    readability: Some(self.readability_one(text)),
                    length: Some(length_score(text)),
                };
                (model.clone(), scores)
            }
        });
        join_all(scored).await.into_iter().collect()
    }
}

fn hallucination_from(similarity: f64) -> f64 {
    1.0 - similarity
}
