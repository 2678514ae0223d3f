//! Configuration module for Judge Core.
//!
//! Loads configuration from YAML files and environment variables.

use std::collections::HashSet;

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::TimeRange;
use crate::error::{JudgeError, JudgeResult};

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default = "default_backends")]
    pub backends: Vec<BackendConfig>,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
}

/// Credentials and limits shared by every hosted inference call.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Bearer token for the inference provider.
    pub api_token: String,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

/// Wire protocol spoken by a generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// `{inputs, parameters}` text-generation endpoint.
    TextGeneration,
    /// OpenAI-compatible chat completions endpoint.
    ChatCompletion,
}

/// One configured generation backend.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Human-readable identifier, used as the key in every result mapping.
    pub name: String,
    pub kind: BackendKind,
    pub url: String,
    /// Model id sent in the request body (chat completions only).
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
}

/// Metric source configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub embedding_url: String,
    pub toxicity_url: String,
    /// Readability reported when the scorer cannot produce a value.
    pub readability_neutral: f64,
}

/// Analytics configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Rolling window used when a query does not name one (24h, 7d, 30d, 90d).
    pub default_window: String,
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JUDGE__*)
    /// 2. config/local.yaml (if exists)
    /// 3. config/default.yaml
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("JUDGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> JudgeResult<()> {
        let mut seen = HashSet::new();
        for backend in &self.backends {
            if backend.name.trim().is_empty() {
                return Err(JudgeError::Config("backend name must not be empty".to_string()));
            }
            if !seen.insert(backend.name.as_str()) {
                return Err(JudgeError::Config(format!(
                    "duplicate backend name '{}'",
                    backend.name
                )));
            }
            if backend.kind == BackendKind::ChatCompletion && backend.model.is_none() {
                return Err(JudgeError::Config(format!(
                    "chat completion backend '{}' needs a model",
                    backend.name
                )));
            }
        }
        self.analytics.window()?;
        Ok(())
    }
}

impl AnalyticsConfig {
    /// Parse the configured default window.
    pub fn window(&self) -> JudgeResult<TimeRange> {
        self.default_window.parse().map_err(JudgeError::Config)
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_new_tokens() -> u32 {
    200
}

fn default_readability_neutral() -> f64 {
    0.5
}

fn default_backends() -> Vec<BackendConfig> {
    const CHAT_URL: &str = "https://router.huggingface.co/nebius/v1/chat/completions";
    vec![
        BackendConfig {
            name: "Mistral 7B Instruct v0.3".to_string(),
            kind: BackendKind::TextGeneration,
            url: "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.3"
                .to_string(),
            model: None,
            temperature: default_temperature(),
            max_new_tokens: default_max_new_tokens(),
        },
        BackendConfig {
            name: "Mistral NeMo Instruct".to_string(),
            kind: BackendKind::ChatCompletion,
            url: CHAT_URL.to_string(),
            model: Some("mistralai/Mistral-Nemo-Instruct-2407".to_string()),
            temperature: default_temperature(),
            max_new_tokens: default_max_new_tokens(),
        },
        BackendConfig {
            name: "Mistral Small 3.1 24B Instruct".to_string(),
            kind: BackendKind::ChatCompletion,
            url: CHAT_URL.to_string(),
            model: Some("mistralai/Mistral-Small-3.1-24B-Instruct-2503".to_string()),
            temperature: default_temperature(),
            max_new_tokens: default_max_new_tokens(),
        },
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            embedding_url: "https://api-inference.huggingface.co/pipeline/feature-extraction/sentence-transformers/all-MiniLM-L6-v2".to_string(),
            toxicity_url: "https://api-inference.huggingface.co/models/unitary/toxic-bert"
                .to_string(),
            readability_neutral: default_readability_neutral(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_window: "24h".to_string(),
        }
    }
}
