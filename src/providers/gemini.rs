//! Google Gemini provider
//!
//! The API key travels as the `key` query parameter; no auth header is sent

use super::ProviderRequest;
use crate::config::EndpointConfig;
use crate::models::gemini::{GeminiRequest, GeminiResponse};
use reqwest::{Client, RequestBuilder};

/// Build the request URL (without the key parameter)
pub fn build_url(endpoint: &EndpointConfig) -> String {
    format!(
        "{}/models/{}:generateContent",
        endpoint.base_url.trim_end_matches('/'),
        endpoint.model
    )
}

pub(super) fn request(
    client: &Client,
    endpoint: &EndpointConfig,
    request: &ProviderRequest,
) -> RequestBuilder {
    let body = GeminiRequest::from_prompt(&request.prompt, request.max_tokens);

    client
        .post(build_url(endpoint))
        .query(&[("key", request.secret.as_str())])
        .header("Content-Type", "application/json")
        .json(&body)
}

pub(super) fn extract_text(body: &str) -> Option<String> {
    serde_json::from_str::<GeminiResponse>(body).ok()?.into_text()
}
