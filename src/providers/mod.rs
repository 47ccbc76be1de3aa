//! Provider module
//!
//! One calling convention over the five upstream AI HTTP APIs. Each
//! submodule knows its provider's URL, auth placement, request shape and
//! success field path; [`ProviderClient`] does the dispatch and normalizes
//! failures into [`ProviderError`].

pub mod anthropic;
pub mod gemini;
pub mod ollama;
pub mod openai;

pub use crate::models::provider::ProviderKind;

use crate::config::ProvidersConfig;
use crate::utils::logging::truncate_for_log;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

/// Default generation bound for a single call
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Used when a non-success response carries no readable message
const FALLBACK_ERROR_MESSAGE: &str = "unknown error";
const OLLAMA_FALLBACK_ERROR_MESSAGE: &str = "make sure Ollama is running";
const MISSING_TEXT_MESSAGE: &str = "response did not contain generated text";

/// Adapter errors
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Non-success status, transport failure, or a response without generated text
    #[error("{} API call failed: {message}", .provider.display_name())]
    Upstream {
        provider: ProviderKind,
        /// Upstream HTTP status, absent for transport failures
        status: Option<u16>,
        message: String,
    },

    #[error("Invalid provider request: {0}")]
    InvalidRequest(String),

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl ProviderError {
    fn upstream(provider: ProviderKind, status: Option<u16>, message: impl Into<String>) -> Self {
        ProviderError::Upstream {
            provider,
            status,
            message: message.into(),
        }
    }
}

/// A single AI call; constructed per request and discarded afterwards
#[derive(Clone)]
pub struct ProviderRequest {
    pub provider: ProviderKind,
    /// API key, or the base URL for Ollama
    pub secret: String,
    pub prompt: String,
    pub max_tokens: u32,
}

impl ProviderRequest {
    pub fn new(
        provider: ProviderKind,
        secret: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            secret: secret.into(),
            prompt: prompt.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

impl fmt::Debug for ProviderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRequest")
            .field("provider", &self.provider)
            .field("secret", &"[redacted]")
            .field("prompt", &truncate_for_log(&self.prompt, 80))
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

/// Text completion seam used by the assistant service
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run one prompt against the request's provider and return the generated text
    async fn invoke(&self, request: &ProviderRequest) -> Result<String, ProviderError>;
}

/// HTTP adapter over all supported providers
#[derive(Debug, Clone)]
pub struct ProviderClient {
    client: Client,
    endpoints: ProvidersConfig,
}

impl ProviderClient {
    /// Create a client using the configured endpoints and timeout
    pub fn new(endpoints: ProvidersConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(endpoints.timeout))
            .user_agent(concat!("worklog-ai/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;

        Ok(Self { client, endpoints })
    }

    fn build_request(&self, request: &ProviderRequest) -> RequestBuilder {
        let endpoint = self.endpoints.endpoint(request.provider);
        match request.provider {
            ProviderKind::Anthropic => anthropic::request(&self.client, endpoint, request),
            ProviderKind::OpenAI | ProviderKind::DeepSeek => {
                openai::request(&self.client, endpoint, request)
            }
            ProviderKind::Google => gemini::request(&self.client, endpoint, request),
            ProviderKind::Ollama => ollama::request(&self.client, endpoint, request),
        }
    }

    fn extract_text(provider: ProviderKind, body: &str) -> Option<String> {
        match provider {
            ProviderKind::Anthropic => anthropic::extract_text(body),
            ProviderKind::OpenAI | ProviderKind::DeepSeek => openai::extract_text(body),
            ProviderKind::Google => gemini::extract_text(body),
            ProviderKind::Ollama => ollama::extract_text(body),
        }
    }

    fn fallback_message(provider: ProviderKind) -> &'static str {
        match provider {
            ProviderKind::Ollama => OLLAMA_FALLBACK_ERROR_MESSAGE,
            _ => FALLBACK_ERROR_MESSAGE,
        }
    }

    /// Send one prompt to the request's provider
    pub async fn invoke(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        if request.max_tokens == 0 {
            return Err(ProviderError::InvalidRequest(
                "max_tokens must be positive".to_string(),
            ));
        }

        let provider = request.provider;
        debug!(
            provider = %provider,
            prompt_chars = request.prompt.chars().count(),
            max_tokens = request.max_tokens,
            "Sending AI provider request"
        );

        let response = self.build_request(request).send().await.map_err(|e| {
            let message = if e.is_timeout() {
                "request timed out".to_string()
            } else {
                // The URL can carry the API key as a query parameter
                e.without_url().to_string()
            };
            error!(provider = %provider, "AI provider request failed: {}", message);
            ProviderError::upstream(provider, None, message)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::upstream(provider, Some(status.as_u16()), e.without_url().to_string())
        })?;

        if !status.is_success() {
            let message = crate::models::UpstreamErrorBody::message_from(&body)
                .unwrap_or_else(|| Self::fallback_message(provider).to_string());
            error!(
                provider = %provider,
                status = status.as_u16(),
                "AI provider returned error: {}",
                truncate_for_log(&message, 200)
            );
            return Err(ProviderError::upstream(provider, Some(status.as_u16()), message));
        }

        match Self::extract_text(provider, &body) {
            Some(text) => {
                debug!(
                    provider = %provider,
                    response_chars = text.chars().count(),
                    "AI provider request completed"
                );
                Ok(text)
            }
            None => {
                error!(provider = %provider, "AI provider response missing generated text");
                Err(ProviderError::upstream(
                    provider,
                    Some(status.as_u16()),
                    MISSING_TEXT_MESSAGE,
                ))
            }
        }
    }
}

#[async_trait]
impl CompletionClient for ProviderClient {
    async fn invoke(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        ProviderClient::invoke(self, request).await
    }
}
