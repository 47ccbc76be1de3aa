//! Stored provider credential models

use super::provider::ProviderKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One encrypted secret per (user, provider) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredential {
    pub id: i64,
    pub user_id: String,
    pub provider: ProviderKind,
    /// Vault token; never serialized into responses
    #[serde(skip_serializing)]
    pub ciphertext: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Provider listing entry, without any secret material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSummary {
    pub provider: ProviderKind,
    pub created_at: DateTime<Utc>,
}

/// Decrypted credential ready to hand to the provider adapter
#[derive(Clone)]
pub struct ResolvedCredential {
    pub provider: ProviderKind,
    pub secret: String,
}

impl fmt::Debug for ResolvedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredential")
            .field("provider", &self.provider)
            .field("secret", &"[redacted]")
            .finish()
    }
}

/// Body of a save-key request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveApiKeyRequest {
    pub api_key: String,
}

/// Masked view of a stored credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyStatus {
    pub success: bool,
    pub has_api_key: bool,
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ApiKeyStatus {
    /// Status for a provider with no stored key
    pub fn missing() -> Self {
        Self {
            success: true,
            has_api_key: false,
            api_key: None,
            provider: None,
            created_at: None,
        }
    }
}

/// Configured providers of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyList {
    pub success: bool,
    pub providers: Vec<CredentialSummary>,
}
