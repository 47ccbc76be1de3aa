//! Anthropic Messages API data models
//!
//! Only the subset needed for single-turn text generation

use super::ChatMessage;
use serde::{Deserialize, Serialize};

/// Messages API request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicRequest {
    /// Model name
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Message list
    pub messages: Vec<ChatMessage>,
}

/// Messages API response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnthropicResponse {
    #[serde(default)]
    pub content: Vec<AnthropicContentBlock>,
}

/// Response content block
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicContentBlock {
    #[serde(rename = "type", default)]
    pub block_type: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl AnthropicResponse {
    /// Text of the first content block (`content[0].text`)
    pub fn into_text(self) -> Option<String> {
        self.content.into_iter().next()?.text
    }
}
