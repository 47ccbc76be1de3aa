//! Provider identifiers
//!
//! The closed set of upstream AI providers a user can store credentials for

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Upstream AI provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Anthropic,
    OpenAI,
    Google,
    Ollama,
    DeepSeek,
}

/// Returned when parsing an unknown provider id
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported AI provider: {0}")]
pub struct UnknownProvider(pub String);

impl ProviderKind {
    /// Every supported provider
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::Anthropic,
        ProviderKind::OpenAI,
        ProviderKind::Google,
        ProviderKind::Ollama,
        ProviderKind::DeepSeek,
    ];

    /// Stable lowercase id used in storage and URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Google => "google",
            ProviderKind::Ollama => "ollama",
            ProviderKind::DeepSeek => "deepseek",
        }
    }

    /// Human-facing name used in error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "Claude",
            ProviderKind::OpenAI => "OpenAI",
            ProviderKind::Google => "Gemini",
            ProviderKind::Ollama => "Ollama",
            ProviderKind::DeepSeek => "DeepSeek",
        }
    }

    /// Prefix of the environment variables overriding this provider's endpoint
    pub fn env_prefix(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "ANTHROPIC",
            ProviderKind::OpenAI => "OPENAI",
            ProviderKind::Google => "GOOGLE",
            ProviderKind::Ollama => "OLLAMA",
            ProviderKind::DeepSeek => "DEEPSEEK",
        }
    }

    /// Whether the stored secret is an endpoint URL rather than an API key
    pub fn secret_is_endpoint(&self) -> bool {
        matches!(self, ProviderKind::Ollama)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}
