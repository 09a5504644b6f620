//! Text generation backends

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::config::LlmConfig;
use crate::{Error, Result};

/// Trait for hosted text-generation services
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Get the name of this backend
    fn name(&self) -> &'static str;

    /// Model identifier requests are sent to
    fn model(&self) -> &str;

    /// Submit one prompt and return the first candidate's text
    async fn generate(&self, prompt: &str, temperature: f64) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|t| !t.is_empty())
    }
}

const FORMAT_ERROR: &str = "Unexpected response format from Gemini API";

/// Google Gemini `generateContent` backend
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
    api_key: String,
}

impl GeminiBackend {
    /// Create a backend for `model` under `base_url` (e.g. `https://host/v1beta`)
    pub fn new(base_url: &str, model: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, model, api_key, Duration::from_secs(600))
    }

    /// Create a backend with an explicit request timeout
    pub fn with_timeout(
        base_url: &str,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let model = model.into();
        let api_key = api_key.into();

        if api_key.trim().is_empty() {
            return Err(Error::Config(
                "Gemini API key is not set (GEMINI_API_KEY or [gemini] api_key in secrets.toml)"
                    .to_string(),
            ));
        }
        if model.trim().is_empty() {
            return Err(Error::Config("LLM model name is empty".to_string()));
        }

        let endpoint = format!(
            "{}/models/{}:generateContent",
            base_url.trim_end_matches('/'),
            model
        );
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| Error::Config(format!("Invalid LLM endpoint {}: {}", endpoint, e)))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            model,
            api_key,
        })
    }

    /// Create a backend from the `[llm]` config section
    pub fn from_config(config: &LlmConfig, api_key: Option<&str>) -> Result<Self> {
        Self::with_timeout(
            &config.base_url,
            config.model.clone(),
            api_key.unwrap_or_default(),
            config.timeout,
        )
    }

    /// Full `generateContent` URL, without the key
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, temperature: f64) -> Result<String> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": temperature,
                "candidateCount": 1,
            },
        });

        debug!(
            model = %self.model,
            temperature,
            prompt_chars = prompt.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or(status.as_str());
            warn!(status = status.as_u16(), "Gemini API returned an error status");
            return Err(Error::Transport(format!("Gemini API error: {}", reason)));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|_| Error::Format(FORMAT_ERROR.to_string()))?;

        parsed
            .into_text()
            .ok_or_else(|| Error::Format(FORMAT_ERROR.to_string()))
    }
}
