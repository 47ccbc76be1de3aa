//! OpenAI chat completion data models
//!
//! DeepSeek exposes the same request and response shape

use super::ChatMessage;
use serde::{Deserialize, Serialize};

/// Chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIRequest {
    /// Model name
    pub model: String,
    /// Message list
    pub messages: Vec<ChatMessage>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

/// Chat completion response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenAIResponse {
    #[serde(default)]
    pub choices: Vec<OpenAIChoice>,
}

/// Choice structure
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub message: Option<OpenAIResponseMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Assistant message inside a choice
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    /// Content is `null` for tool-call-only replies
    #[serde(default)]
    pub content: Option<String>,
}

impl OpenAIResponse {
    /// Content of the first choice (`choices[0].message.content`)
    pub fn into_text(self) -> Option<String> {
        self.choices.into_iter().next()?.message?.content
    }
}
