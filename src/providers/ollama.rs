//! Ollama provider
//!
//! Local model server. There is no API key: the stored secret is the
//! server's base URL, and an empty secret means the configured default.

use super::ProviderRequest;
use crate::config::EndpointConfig;
use crate::models::ollama::{OllamaOptions, OllamaRequest, OllamaResponse};
use reqwest::{Client, RequestBuilder};

/// Base URL to use for a request
pub fn resolve_base_url<'a>(endpoint: &'a EndpointConfig, secret: &'a str) -> &'a str {
    let secret = secret.trim();
    if secret.is_empty() {
        &endpoint.base_url
    } else {
        secret
    }
}

/// Build the request URL
pub fn build_url(base_url: &str) -> String {
    format!("{}/api/generate", base_url.trim_end_matches('/'))
}

pub(super) fn request(
    client: &Client,
    endpoint: &EndpointConfig,
    request: &ProviderRequest,
) -> RequestBuilder {
    let body = OllamaRequest {
        model: endpoint.model.clone(),
        prompt: request.prompt.clone(),
        stream: false,
        options: OllamaOptions {
            num_predict: request.max_tokens,
        },
    };

    client
        .post(build_url(resolve_base_url(endpoint, &request.secret)))
        .header("Content-Type", "application/json")
        .json(&body)
}

pub(super) fn extract_text(body: &str) -> Option<String> {
    serde_json::from_str::<OllamaResponse>(body).ok()?.response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> EndpointConfig {
        EndpointConfig {
            base_url: "http://localhost:11434".to_string(),
            model: "llama2".to_string(),
        }
    }

    #[test]
    fn test_resolve_base_url() {
        let endpoint = endpoint();
        assert_eq!(resolve_base_url(&endpoint, ""), "http://localhost:11434");
        assert_eq!(resolve_base_url(&endpoint, "   "), "http://localhost:11434");
        assert_eq!(resolve_base_url(&endpoint, "http://gpu-box:11434"), "http://gpu-box:11434");
    }

    #[test]
    fn test_build_url() {
        assert_eq!(build_url("http://gpu-box:11434/"), "http://gpu-box:11434/api/generate");
    }

    #[test]
    fn test_extract_text() {
        let body = r#"{"model":"llama2","created_at":"2024-01-01T00:00:00Z","response":"local answer","done":true}"#;
        assert_eq!(extract_text(body), Some("local answer".to_string()));
        assert_eq!(extract_text(r#"{"model":"llama2","done":true}"#), None);
    }
}
