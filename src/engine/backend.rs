//! Generation backends: hosted LLM endpoints that turn a prompt into text.
//!
//! Two wire shapes are supported:
//! - text-generation endpoints taking `{inputs, parameters}` and answering
//!   with `generated_text` either as an object or a list of objects
//! - OpenAI-compatible chat completions endpoints

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{BackendConfig, BackendKind};
use crate::engine::http::InferenceClient;
use crate::error::{BackendError, JudgeError, JudgeResult};

/// A remote model that can complete a prompt.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Stable, human-readable identifier used as the result key.
    fn name(&self) -> &str;

    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, BackendError>;
}

/// Request body for text-generation endpoints.
#[derive(Debug, Serialize)]
struct TextGenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    temperature: f32,
    max_new_tokens: u32,
}

/// Pull `generated_text` out of a text-generation response.
///
/// Accepts a single object or a non-empty list (first element wins). Any
/// other shape is stringified rather than treated as a failure.
pub fn extract_generated_text(output: &Value) -> String {
    fn field(value: &Value) -> Option<&str> {
        value.get("generated_text")?.as_str()
    }

    let text = match output {
        Value::Array(items) => items.first().and_then(field),
        Value::Object(_) => field(output),
        _ => None,
    };

    match text {
        Some(text) => text.to_string(),
        None => match output {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

/// Backend speaking the `{inputs, parameters}` text-generation protocol.
pub struct TextGenerationBackend {
    name: String,
    url: String,
    temperature: f32,
    max_new_tokens: u32,
    client: InferenceClient,
}

impl TextGenerationBackend {
    pub fn new(config: &BackendConfig, client: InferenceClient) -> Self {
        Self {
            name: config.name.clone(),
            url: config.url.clone(),
            temperature: config.temperature,
            max_new_tokens: config.max_new_tokens,
            client,
        }
    }
}

#[async_trait]
impl GenerationBackend for TextGenerationBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let request = TextGenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                temperature: self.temperature,
                max_new_tokens: self.max_new_tokens,
            },
        };

        let output = self.client.post_json(&self.url, &request).await?;
        Ok(extract_generated_text(&output))
    }
}

/// Request to an OpenAI-compatible chat completions API.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response from a chat completions API.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Pull the first choice's content out of a chat completions response.
pub fn extract_chat_content(output: Value) -> Result<String, BackendError> {
    let response: ChatResponse =
        serde_json::from_value(output).map_err(|e| BackendError::Malformed(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| BackendError::Malformed("no message content in choices".to_string()))
}

/// Backend speaking the OpenAI-compatible chat completions protocol.
pub struct ChatCompletionBackend {
    name: String,
    url: String,
    model: String,
    temperature: f32,
    max_new_tokens: u32,
    client: InferenceClient,
}

impl ChatCompletionBackend {
    pub fn new(config: &BackendConfig, model: String, client: InferenceClient) -> Self {
        Self {
            name: config.name.clone(),
            url: config.url.clone(),
            model,
            temperature: config.temperature,
            max_new_tokens: config.max_new_tokens,
            client,
        }
    }
}

#[async_trait]
impl GenerationBackend for ChatCompletionBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: Some(self.max_new_tokens),
            temperature: Some(self.temperature),
        };

        let output = self.client.post_json(&self.url, &request).await?;
        extract_chat_content(output)
    }
}

/// Build a backend for each configured entry, in configuration order.
///
/// A chat completions entry must name a model.
pub fn build_backends(
    configs: &[BackendConfig],
    client: &InferenceClient,
) -> JudgeResult<Vec<Arc<dyn GenerationBackend>>> {
    configs
        .iter()
        .map(|config| -> JudgeResult<Arc<dyn GenerationBackend>> {
            match (config.kind, &config.model) {
                (BackendKind::ChatCompletion, Some(model)) => Ok(Arc::new(
                    ChatCompletionBackend::new(config, model.clone(), client.clone()),
                )),
                (BackendKind::ChatCompletion, None) => Err(JudgeError::Config(format!(
                    "chat completion backend '{}' needs a model",
                    config.name
                ))),
                (BackendKind::TextGeneration, _) => {
                    Ok(Arc::new(TextGenerationBackend::new(config, client.clone())))
                }
            }
        })
        .collect()
}
