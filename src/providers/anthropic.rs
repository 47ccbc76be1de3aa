//! Anthropic provider
//!
//! Messages API with `x-api-key` authentication

use super::ProviderRequest;
use crate::config::EndpointConfig;
use crate::models::anthropic::{AnthropicRequest, AnthropicResponse};
use crate::models::ChatMessage;
use reqwest::{Client, RequestBuilder};

/// Pinned Messages API version
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Build the request URL
pub fn build_url(endpoint: &EndpointConfig) -> String {
    format!("{}/messages", endpoint.base_url.trim_end_matches('/'))
}

pub(super) fn request(
    client: &Client,
    endpoint: &EndpointConfig,
    request: &ProviderRequest,
) -> RequestBuilder {
    let body = AnthropicRequest {
        model: endpoint.model.clone(),
        max_tokens: request.max_tokens,
        messages: vec![ChatMessage::user(request.prompt.clone())],
    };

    client
        .post(build_url(endpoint))
        .header("x-api-key", &request.secret)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .header("Content-Type", "application/json")
        .json(&body)
}

pub(super) fn extract_text(body: &str) -> Option<String> {
    serde_json::from_str::<AnthropicResponse>(body).ok()?.into_text()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let endpoint = EndpointConfig {
            base_url: "https://api.anthropic.com/v1/".to_string(),
            model: "claude-3-5-sonnet-20241022".to_string(),
        };
        assert_eq!(build_url(&endpoint), "https://api.anthropic.com/v1/messages");
    }

    #[test]
    fn test_extract_text() {
        let body = r#"{"id":"msg_1","type":"message","role":"assistant","content":[{"type":"text","text":"Hi there"}],"stop_reason":"end_turn"}"#;
        assert_eq!(extract_text(body), Some("Hi there".to_string()));
        assert_eq!(extract_text(r#"{"content":[]}"#), None);
        assert_eq!(extract_text("not json"), None);
    }
}
