//! Provider key management
//!
//! Save, inspect and remove a user's provider credentials. Secrets are
//! encrypted before storage and only ever read back in masked form.

use crate::models::credential::{ApiKeyList, ApiKeyStatus};
use crate::models::provider::ProviderKind;
use crate::models::MessageResponse;
use crate::services::store::CredentialStore;
use crate::services::vault::{mask, CredentialVault};
use crate::utils::error::{helpers, AppResult};
use std::sync::Arc;
use tracing::info;

/// Check a secret's shape for its provider
///
/// Returns the trimmed secret.
pub fn validate_secret(provider: ProviderKind, secret: &str) -> AppResult<String> {
    let secret = secret.trim();
    if secret.is_empty() {
        return Err(helpers::validation_error("API key cannot be empty"));
    }

    let required_prefix = match provider {
        ProviderKind::Anthropic => Some("sk-ant-"),
        ProviderKind::OpenAI | ProviderKind::DeepSeek => Some("sk-"),
        ProviderKind::Google | ProviderKind::Ollama => None,
    };
    if let Some(prefix) = required_prefix {
        if !secret.starts_with(prefix) {
            return Err(helpers::validation_error(format!(
                "{} API key must start with {}",
                provider.display_name(),
                prefix
            )));
        }
    }

    if provider.secret_is_endpoint()
        && !(secret.starts_with("http://") || secret.starts_with("https://"))
    {
        return Err(helpers::validation_error(
            "Ollama base URL must start with http:// or https://",
        ));
    }

    Ok(secret.to_string())
}

/// Per-user credential operations
#[derive(Clone)]
pub struct KeyService {
    store: Arc<dyn CredentialStore>,
    vault: CredentialVault,
}

impl KeyService {
    pub fn new(store: Arc<dyn CredentialStore>, vault: CredentialVault) -> Self {
        Self { store, vault }
    }

    /// Validate, encrypt and upsert a provider secret
    pub async fn save_key(
        &self,
        user_id: &str,
        provider: ProviderKind,
        secret: &str,
    ) -> AppResult<MessageResponse> {
        let secret = validate_secret(provider, secret)?;
        let token = self.vault.encrypt(&secret)?;
        self.store.upsert_credential(user_id, provider, &token).await?;

        info!(provider = %provider, "API key saved");
        Ok(MessageResponse::ok("API key saved"))
    }

    /// Masked view of the stored secret
    pub async fn get_key(&self, user_id: &str, provider: ProviderKind) -> AppResult<ApiKeyStatus> {
        let Some(stored) = self.store.find_credential(user_id, provider).await? else {
            return Ok(ApiKeyStatus::missing());
        };

        let secret = self.vault.decrypt(&stored.ciphertext)?;
        Ok(ApiKeyStatus {
            success: true,
            has_api_key: true,
            api_key: Some(mask(&secret)),
            provider: Some(stored.provider),
            created_at: Some(stored.created_at),
        })
    }

    pub async fn list_keys(&self, user_id: &str) -> AppResult<ApiKeyList> {
        let providers = self.store.list_credentials(user_id).await?;
        Ok(ApiKeyList {
            success: true,
            providers,
        })
    }

    /// Remove a provider secret; removing an absent key is not an error
    pub async fn delete_key(
        &self,
        user_id: &str,
        provider: ProviderKind,
    ) -> AppResult<MessageResponse> {
        let removed = self.store.delete_credential(user_id, provider).await?;
        if removed {
            info!(provider = %provider, "API key deleted");
        }
        Ok(MessageResponse::ok("API key deleted"))
    }
}
