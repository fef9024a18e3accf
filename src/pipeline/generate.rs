//! Generative-model collaborator used when no canned answer matches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;

/// Preferred medical model prefixes, most specific first.
const MEDICAL_MODELS: &[&str] = &[
    "medgemma:27b",
    "medgemma:4b",
    "medgemma:latest",
    "medgemma",
];

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Ollama connection failed: {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Ollama returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Model produced no output")]
    EmptyOutput,

    #[error("No model available")]
    NoModelAvailable,
}

/// Parameters of a single generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Upper bound on generated tokens.
    pub max_length: u32,
    pub num_return_sequences: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_length: config::MAX_GENERATION_LENGTH,
            num_return_sequences: 1,
        }
    }

    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = max_length;
        self
    }
}

/// Produces free text from a prompt.
pub trait TextGenerator: Send + Sync {
    /// Returns `num_return_sequences` candidates, never an empty list on success.
    fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>, GenerateError>;

    /// Whether the backing model can currently serve requests.
    fn is_available(&self) -> bool;
}

/// Ollama HTTP client for local LLM inference.
pub struct OllamaGenerator {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaGenerator {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, GenerateError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GenerateError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    /// Default Ollama instance at localhost:11434 with 5-minute timeout.
    pub fn default_local() -> Result<Self, GenerateError> {
        Self::new(config::DEFAULT_OLLAMA_URL, config::DEFAULT_MODEL, 300)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Switch to the best installed medical model, keeping the configured
    /// one when none of the preferred models is present.
    pub fn resolve_preferred_model(&mut self) -> Result<&str, GenerateError> {
        let available = self.list_models()?;
        if let Some(best) = pick_preferred(&available) {
            tracing::info!(model = best, "Ollama generator: preferred model found");
            self.model = best.to_string();
        } else if !available.iter().any(|m| m.starts_with(&self.model)) {
            return Err(GenerateError::NoModelAvailable);
        }
        Ok(&self.model)
    }

    pub fn list_models(&self) -> Result<Vec<String>, GenerateError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().map_err(|e| {
            if e.is_connect() {
                GenerateError::Connection(self.base_url.clone())
            } else {
                GenerateError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerateError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| GenerateError::ResponseParsing(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }

    fn generate_once(&self, request: &GenerationRequest) -> Result<String, GenerateError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt: &request.prompt,
            stream: false,
            options: OllamaOptions {
                num_predict: request.max_length,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    GenerateError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    GenerateError::Http(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    GenerateError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerateError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| GenerateError::ResponseParsing(e.to_string()))?;

        if parsed.response.trim().is_empty() {
            return Err(GenerateError::EmptyOutput);
        }
        Ok(parsed.response)
    }
}

/// Installed model name matching the earliest preference prefix.
fn pick_preferred(available: &[String]) -> Option<&str> {
    MEDICAL_MODELS.iter().find_map(|preferred| {
        available
            .iter()
            .find(|m| m.starts_with(preferred))
            .map(String::as_str)
    })
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_predict: u32,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

impl TextGenerator for OllamaGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>, GenerateError> {
        let count = request.num_return_sequences.max(1);
        (0..count).map(|_| self.generate_once(request)).collect()
    }

    fn is_available(&self) -> bool {
        match self.list_models() {
            Ok(models) => models.iter().any(|m| m.starts_with(&self.model)),
            Err(e) => {
                tracing::debug!(error = %e, "Ollama generator: cannot reach Ollama");
                false
            }
        }
    }
}

/// Generator for tests: returns a configurable response or fails.
pub struct MockGenerator {
    response: Option<String>,
}

impl MockGenerator {
    pub fn new(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { response: None }
    }
}

impl TextGenerator for MockGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>, GenerateError> {
        match &self.response {
            Some(text) => Ok(vec![text.clone(); request.num_return_sequences.max(1) as usize]),
            None => Err(GenerateError::Connection("mock://ollama".into())),
        }
    }

    fn is_available(&self) -> bool {
        self.response.is_some()
    }
}
