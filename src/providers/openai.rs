//! OpenAI-compatible provider
//!
//! Serves both OpenAI and DeepSeek, which share the chat completions shape
//! and bearer authentication

use super::ProviderRequest;
use crate::config::EndpointConfig;
use crate::models::openai::{OpenAIRequest, OpenAIResponse};
use crate::models::ChatMessage;
use reqwest::{Client, RequestBuilder};

/// Build the request URL
pub fn build_url(endpoint: &EndpointConfig) -> String {
    format!("{}/chat/completions", endpoint.base_url.trim_end_matches('/'))
}

pub(super) fn request(
    client: &Client,
    endpoint: &EndpointConfig,
    request: &ProviderRequest,
) -> RequestBuilder {
    let body = OpenAIRequest {
        model: endpoint.model.clone(),
        messages: vec![ChatMessage::user(request.prompt.clone())],
        max_tokens: request.max_tokens,
    };

    client
        .post(build_url(endpoint))
        .header("Authorization", format!("Bearer {}", request.secret))
        .header("Content-Type", "application/json")
        .json(&body)
}

pub(super) fn extract_text(body: &str) -> Option<String> {
    serde_json::from_str::<OpenAIResponse>(body).ok()?.into_text()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let endpoint = EndpointConfig {
            base_url: "https://api.deepseek.com/v1".to_string(),
            model: "deepseek-chat".to_string(),
        };
        assert_eq!(build_url(&endpoint), "https://api.deepseek.com/v1/chat/completions");

        // Test with trailing slash
        let endpoint = EndpointConfig {
            base_url: "https://api.openai.com/v1/".to_string(),
            model: "gpt-4-turbo-preview".to_string(),
        };
        assert_eq!(build_url(&endpoint), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_extract_text() {
        let body = r#"{"id":"chatcmpl-1","object":"chat.completion","choices":[{"index":0,"message":{"role":"assistant","content":"hello"},"finish_reason":"stop"}]}"#;
        assert_eq!(extract_text(body), Some("hello".to_string()));
    }

    #[test]
    fn test_extract_text_missing_paths() {
        assert_eq!(extract_text(r#"{"choices":[]}"#), None);
        assert_eq!(extract_text(r#"{"choices":[{"index":0}]}"#), None);
        let null_content = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert_eq!(extract_text(null_content), None);
    }
}
