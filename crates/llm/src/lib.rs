//! Blogsmith LLM provider infrastructure adapter.
//!
//! Implements the [`pipeline::LlmProvider`] trait for Google's Gemini
//! `generateContent` API, including function calling. Additional providers are
//! added as new `impl` blocks in this crate without any changes to the
//! `pipeline` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All HTTP transport, request formatting, and response
//! parsing live here. The [`pipeline`] crate sees only
//! [`pipeline::LlmProvider`]. There is no retry or back-off: a failed call
//! fails the stage.

mod wire;

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{LlmError, LlmProvider, LlmRequest, LlmResponse, ModelName};
use reqwest::{Client, Url};
use tracing::{debug, instrument};

use crate::wire::{GenerateContentRequest, GenerateContentResponse, GoogleErrorEnvelope};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Public Gemini API host.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Connection and sampling settings for [`GeminiProvider`].
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key sent in the `x-goog-api-key` header.
    pub api_key: String,
    /// Model to call.
    pub model: ModelName,
    /// Scheme and host of the API.
    pub base_url: String,
    /// Per-request timeout. Generation of long articles can be slow.
    pub timeout: Duration,
    /// Sampling temperature; `None` uses the model default.
    pub temperature: Option<f32>,
}

impl GeminiConfig {
    /// Settings for `model` on the public API.
    pub fn new(api_key: impl Into<String>, model: ModelName) -> Self {
        Self {
            api_key: api_key.into(),
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(180),
            temperature: None,
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// [`LlmProvider`] backed by the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    endpoint: Url,
    api_key: String,
    temperature: Option<f32>,
}

impl GeminiProvider {
    /// Builds a provider from `config`.
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        let path = format!("/v1beta/models/{}:generateContent", config.model);
        let endpoint = Url::parse(config.base_url.trim_end_matches('/'))
            .and_then(|base| base.join(&path))
            .map_err(|e| LlmError::InvalidConfig(format!("base URL '{}': {e}", config.base_url)))?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    #[instrument(skip_all, fields(turns = request.messages.len(), tools = request.tools.len()))]
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = GenerateContentRequest::from_request(&request, self.temperature);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GoogleErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(text);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;
        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                prompt_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "gemini usage"
            );
        }
        parsed.into_response()
    }
}
