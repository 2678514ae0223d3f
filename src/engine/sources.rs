//! Metric sources: hosted models the evaluator treats as black boxes.
//!
//! - Embedding encoder: text -> vector, used for semantic correctness
//! - Toxicity classifier: text -> labeled scores, used for safety

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::engine::http::InferenceClient;
use crate::error::{ClassificationError, EmbeddingError};

/// Turns text into a fixed-length vector.
#[async_trait]
pub trait EmbeddingSource: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// One label emitted by the toxicity classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Scores text against toxicity labels.
#[async_trait]
pub trait ToxicitySource: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Vec<LabelScore>, ClassificationError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EmbeddingPayload {
    Flat(Vec<f32>),
    Batched(Vec<Vec<f32>>),
}

/// Decode a feature-extraction response: a vector, or a batch holding one.
pub fn parse_embedding(output: Value) -> Result<Vec<f32>, EmbeddingError> {
    let payload: EmbeddingPayload =
        serde_json::from_value(output).map_err(|e| EmbeddingError::Malformed(e.to_string()))?;

    let vector = match payload {
        EmbeddingPayload::Flat(vector) => vector,
        EmbeddingPayload::Batched(rows) => rows
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Malformed("empty embedding batch".to_string()))?,
    };

    if vector.is_empty() {
        return Err(EmbeddingError::Malformed("empty embedding".to_string()));
    }
    Ok(vector)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClassificationPayload {
    Flat(Vec<LabelScore>),
    Batched(Vec<Vec<LabelScore>>),
}

/// Decode a text-classification response: a label list, or a batch whose
/// first row is the label list.
pub fn parse_classification(output: Value) -> Result<Vec<LabelScore>, ClassificationError> {
    let payload: ClassificationPayload = serde_json::from_value(output)
        .map_err(|e| ClassificationError::Malformed(e.to_string()))?;

    Ok(match payload {
        ClassificationPayload::Flat(labels) => labels,
        ClassificationPayload::Batched(rows) => rows.into_iter().next().unwrap_or_default(),
    })
}

/// Feature-extraction endpoint (sentence-transformers style).
pub struct HttpEmbeddingSource {
    url: String,
    client: InferenceClient,
}

impl HttpEmbeddingSource {
    pub fn new(url: impl Into<String>, client: InferenceClient) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl EmbeddingSource for HttpEmbeddingSource {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let output = self
            .client
            .post_json(&self.url, &json!({ "inputs": text }))
            .await?;
        parse_embedding(output)
    }
}

/// Text-classification endpoint returning `{label, score}` pairs.
pub struct HttpToxicitySource {
    url: String,
    client: InferenceClient,
}

impl HttpToxicitySource {
    pub fn new(url: impl Into<String>, client: InferenceClient) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl ToxicitySource for HttpToxicitySource {
    async fn classify(&self, text: &str) -> Result<Vec<LabelScore>, ClassificationError> {
        let output = self
            .client
            .post_json(&self.url, &json!({ "inputs": text }))
            .await?;
        parse_classification(output)
    }
}
