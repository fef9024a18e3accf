//! Translation collaborator.
//!
//! Users may type in any language (Hinglish in practice); the response
//! table is keyed in English, so input is translated before matching.
//! Failures are returned to the caller, which decides how to degrade.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

/// Longest text the public endpoint accepts in one request.
const MAX_TEXT_CHARS: usize = 5000;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("Translation service unreachable at {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Translation service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Translation response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Text length {len} outside 1..=5000 characters")]
    InvalidLength { len: usize },
}

/// Translates text between languages. `source` may be `"auto"`.
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslateError>;
}

/// Client for the public Google translate endpoint (`client=gtx`).
pub struct GoogleTranslator {
    endpoint: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GoogleTranslator {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, TranslateError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TranslateError::Http(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Translator for GoogleTranslator {
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslateError> {
        let len = text.chars().count();
        if len == 0 || len > MAX_TEXT_CHARS {
            return Err(TranslateError::InvalidLength { len });
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    TranslateError::Connection(self.endpoint.clone())
                } else if e.is_timeout() {
                    TranslateError::Http(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    TranslateError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TranslateError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: serde_json::Value = response
            .json()
            .map_err(|e| TranslateError::ResponseParsing(e.to_string()))?;

        parse_translation(&payload)
    }
}

/// Joins the translated segments of a `translate_a/single` payload.
///
/// Shape: `[[["<translated>", "<original>", ...], ...], null, "<detected>", ...]`.
fn parse_translation(payload: &serde_json::Value) -> Result<String, TranslateError> {
    let segments = payload
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| TranslateError::ResponseParsing("missing segment list".into()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(|t| t.as_str()))
        .collect();

    if translated.trim().is_empty() {
        return Err(TranslateError::ResponseParsing("empty translation".into()));
    }
    Ok(translated)
}

/// Translator for tests: returns mapped text, or the input unchanged.
pub struct MockTranslator {
    mapping: HashMap<String, String>,
}

impl MockTranslator {
    pub fn identity() -> Self {
        Self {
            mapping: HashMap::new(),
        }
    }

    pub fn with_mapping(mut self, from: &str, to: &str) -> Self {
        self.mapping.insert(from.to_string(), to.to_string());
        self
    }
}

impl Translator for MockTranslator {
    fn translate(&self, text: &str, _source: &str, _target: &str) -> Result<String, TranslateError> {
        Ok(self
            .mapping
            .get(text)
            .cloned()
            .unwrap_or_else(|| text.to_string()))
    }
}

/// Translator for tests. Always fails as if the service were down.
pub struct FailingTranslator;

impl Translator for FailingTranslator {
    fn translate(&self, _text: &str, _source: &str, _target: &str) -> Result<String, TranslateError> {
        Err(TranslateError::Connection("mock://translate".into()))
    }
}
