//! Google Gemini narrative provider.
//!
//! This module provides the [`GeminiProvider`] which implements the
//! [`NarrativeProvider`] trait for Google's Gemini API
//! (<https://ai.google.dev/>).

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{FailureKind, NarrativeFailure, NarrativeProvider, NarrativeReply};
use crate::error::{InsightError, Result};

/// Default Gemini API endpoint.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models/";

/// Default model for narrative generation.
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default timeout for API requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TOP_P: f32 = 0.8;
const DEFAULT_TOP_K: u32 = 40;
const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

// Gemini API request structures
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

// Gemini API response structures
#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<Part>>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Configuration for the Gemini provider.
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    /// The model to use (e.g., "gemini-1.5-flash").
    pub model: String,
    /// Temperature for response generation (0.0 - 2.0).
    pub temperature: f32,
    /// Nucleus sampling threshold.
    pub top_p: f32,
    /// Number of highest-probability tokens considered.
    pub top_k: u32,
    /// Maximum tokens in the response.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Base URL for the API (useful for proxies or custom endpoints).
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }
}

impl GeminiConfig {
    /// Create a new configuration builder.
    pub fn builder() -> GeminiConfigBuilder {
        GeminiConfigBuilder::default()
    }
}

/// Builder for [`GeminiConfig`].
#[derive(Default)]
pub struct GeminiConfigBuilder {
    model: Option<String>,
    temperature: Option<f32>,
    top_p: Option<f32>,
    top_k: Option<u32>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
    base_url: Option<String>,
}

impl GeminiConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Set a custom base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> GeminiConfig {
        GeminiConfig {
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            top_p: self.top_p.unwrap_or(DEFAULT_TOP_P),
            top_k: self.top_k.unwrap_or(DEFAULT_TOP_K),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
        }
    }
}

/// Google Gemini narrative provider.
///
/// # Example
///
/// ```rust,ignore
/// use datainsight_core::ai::{GeminiConfig, GeminiProvider, NarrativeProvider};
///
/// let provider = GeminiProvider::from_env()?;
/// let reply = provider.generate(&prompt)?;
/// println!("{}", reply.text);
/// ```
pub struct GeminiProvider {
    api_key: String,
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, GeminiConfig::default())
    }

    /// Create a new Gemini provider with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is blank or the HTTP client cannot be
    /// created.
    pub fn with_config(api_key: impl Into<String>, config: GeminiConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(InsightError::InvalidConfig(format!("{} is empty", API_KEY_ENV)));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            api_key,
            config,
            client,
        })
    }

    /// Create a provider from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_config(GeminiConfig::default())
    }

    pub fn from_env_with_config(config: GeminiConfig) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| InsightError::InvalidConfig(format!("{} is not set", API_KEY_ENV)))?;
        Self::with_config(api_key, config)
    }

    fn build_request(&self, prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![Content {
                role: "user".to_owned(),
                parts: vec![Part {
                    text: prompt.to_owned(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
                max_output_tokens: self.config.max_tokens,
            },
        }
    }

    fn call_api(&self, prompt: &str) -> std::result::Result<String, NarrativeFailure> {
        // Build URL: {base_url}{model}:generateContent?key={api_key}
        let url = format!(
            "{}{}:generateContent?key={}",
            self.config.base_url, self.config.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&self.build_request(prompt))
            .send()
            .map_err(|e| NarrativeFailure::classify(None, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(NarrativeFailure::classify(
                Some(status.as_u16()),
                error_message(&body).unwrap_or_else(|| format!("Gemini API error {}", status)),
            ));
        }

        let result: GeminiResponse = response
            .json()
            .map_err(|e| NarrativeFailure::new(FailureKind::Generic, e.to_string()))?;

        extract_text(result)
    }
}

/// Message of a Gemini error envelope, when the body is one.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
}

/// Text of the first candidate's parts, joined.
fn extract_text(response: GeminiResponse) -> std::result::Result<String, NarrativeFailure> {
    let candidate = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .ok_or_else(|| {
            NarrativeFailure::new(FailureKind::Generic, "No response content from Gemini API")
        })?;

    if let Some(reason) = candidate.finish_reason.as_deref()
        && (reason == "SAFETY" || reason == "BLOCKED")
    {
        return Err(NarrativeFailure::new(
            FailureKind::SafetyBlocked,
            format!("Response blocked with finish reason {}", reason),
        ));
    }

    let text: String = candidate
        .content
        .and_then(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .map(|part| part.text)
        .collect();

    if text.trim().is_empty() {
        return Err(NarrativeFailure::new(
            FailureKind::Generic,
            "Empty response content from Gemini API",
        ));
    }
    Ok(text)
}

impl NarrativeProvider for GeminiProvider {
    fn generate(&self, prompt: &str) -> std::result::Result<NarrativeReply, NarrativeFailure> {
        debug!(
            "Sending {} character prompt to Gemini model {}",
            prompt.chars().count(),
            self.config.model
        );

        match self.call_api(prompt) {
            Ok(text) => Ok(NarrativeReply {
                text,
                model: self.config.model.clone(),
            }),
            Err(failure) => {
                warn!("Gemini request failed: {}", failure);
                Err(failure)
            }
        }
    }

    fn name(&self) -> &str {
        "Gemini"
    }

    fn model(&self) -> Option<&str> {
        Some(&self.config.model)
    }
}

// ============================================================================
// Tests
// ============================================================================
