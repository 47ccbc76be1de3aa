//! Data models module
//!
//! Defines wire structures for the upstream AI APIs and the domain types
//! exchanged by the journal service

use serde::{Deserialize, Serialize};

pub mod admin;
pub mod anthropic;
pub mod assistant;
pub mod credential;
pub mod entry;
pub mod gemini;
pub mod ollama;
pub mod openai;
pub mod provider;

/// Chat message shared by the Anthropic and OpenAI-compatible request shapes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role (user/assistant/system)
    pub role: String,
    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Acknowledgement body for mutations without a payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Error body returned by upstream APIs on non-success statuses
///
/// Anthropic, OpenAI, Gemini and DeepSeek send `{"error": {"message": ...}}`;
/// Ollama sends `{"error": "..."}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamErrorBody {
    #[serde(default)]
    pub error: Option<UpstreamErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UpstreamErrorDetail {
    Object {
        #[serde(default)]
        message: Option<String>,
    },
    Text(String),
}

impl UpstreamErrorBody {
    /// Extract the upstream-supplied message from a raw response body
    pub fn message_from(body: &str) -> Option<String> {
        let parsed: UpstreamErrorBody = serde_json::from_str(body).ok()?;
        let message = match parsed.error? {
            UpstreamErrorDetail::Object { message } => message?,
            UpstreamErrorDetail::Text(text) => text,
        };
        let message = message.trim();
        if message.is_empty() {
            None
        } else {
            Some(message.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_object() {
        let body = r#"{"error":{"type":"authentication_error","message":"bad key"}}"#;
        assert_eq!(UpstreamErrorBody::message_from(body), Some("bad key".to_string()));
    }

    #[test]
    fn test_error_message_text() {
        let body = r#"{"error":"model 'llama9' not found"}"#;
        assert_eq!(
            UpstreamErrorBody::message_from(body),
            Some("model 'llama9' not found".to_string())
        );
    }

    #[test]
    fn test_error_message_absent() {
        assert_eq!(UpstreamErrorBody::message_from(r#"{"error":{"code":401}}"#), None);
        assert_eq!(UpstreamErrorBody::message_from(r#"{"detail":"nope"}"#), None);
        assert_eq!(UpstreamErrorBody::message_from("<html>502</html>"), None);
        assert_eq!(UpstreamErrorBody::message_from(r#"{"error":{"message":"  "}}"#), None);
    }
}
