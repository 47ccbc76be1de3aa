//! Ollama generate API data models

use serde::{Deserialize, Serialize};

/// `/api/generate` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaRequest {
    pub model: String,
    pub prompt: String,
    /// Always false; the adapter waits for the full response
    pub stream: bool,
    pub options: OllamaOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaOptions {
    pub num_predict: u32,
}

/// `/api/generate` response (non-streaming)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OllamaResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub done: Option<bool>,
}
