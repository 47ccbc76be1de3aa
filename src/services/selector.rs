//! Credential selection
//!
//! Resolves which stored credential an AI call uses: the preferred
//! provider's row if the user has one, else the user's most recently
//! created credential of any provider.

use crate::models::credential::{ResolvedCredential, StoredCredential};
use crate::models::provider::ProviderKind;
use crate::services::store::CredentialStore;
use crate::services::vault::CredentialVault;
use crate::utils::error::{AppError, AppResult};
use std::sync::Arc;
use tracing::debug;

/// Picks and decrypts the credential for a call
#[derive(Clone)]
pub struct CredentialSelector {
    store: Arc<dyn CredentialStore>,
    vault: CredentialVault,
}

impl CredentialSelector {
    pub fn new(store: Arc<dyn CredentialStore>, vault: CredentialVault) -> Self {
        Self { store, vault }
    }

    /// Select a credential for `user_id`, honoring `preferred` when it is configured
    pub async fn select(
        &self,
        user_id: &str,
        preferred: Option<ProviderKind>,
    ) -> AppResult<ResolvedCredential> {
        let stored = self.find_stored(user_id, preferred).await?.ok_or_else(|| {
            AppError::Configuration(match preferred {
                Some(provider) => format!("no API key saved for {}", provider.display_name()),
                None => "no API key saved".to_string(),
            })
        })?;

        debug!(
            provider = %stored.provider,
            preferred = ?preferred,
            "Selected stored credential"
        );

        let secret = self.vault.decrypt(&stored.ciphertext)?;
        Ok(ResolvedCredential {
            provider: stored.provider,
            secret,
        })
    }

    async fn find_stored(
        &self,
        user_id: &str,
        preferred: Option<ProviderKind>,
    ) -> AppResult<Option<StoredCredential>> {
        if let Some(provider) = preferred {
            if let Some(found) = self.store.find_credential(user_id, provider).await? {
                return Ok(Some(found));
            }
        }
        self.store.latest_credential(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::SqliteStore;

    /// Rows are saved in order, a few milliseconds apart
    async fn selector_with(rows: &[(ProviderKind, &str)]) -> CredentialSelector {
        let store = SqliteStore::in_memory().unwrap();
        let vault = CredentialVault::new("selector-test-key");
        for (provider, secret) in rows {
            let token = vault.encrypt(secret).unwrap();
            store.upsert_credential("alice", *provider, &token).await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        CredentialSelector::new(Arc::new(store), vault)
    }

    #[tokio::test]
    async fn test_preferred_provider_wins() {
        let selector = selector_with(&[
            (ProviderKind::OpenAI, "sk-openai"),
            (ProviderKind::Anthropic, "sk-ant-claude"),
        ])
        .await;

        let resolved = selector.select("alice", Some(ProviderKind::OpenAI)).await.unwrap();
        assert_eq!(resolved.provider, ProviderKind::OpenAI);
        assert_eq!(resolved.secret, "sk-openai");
    }

    #[tokio::test]
    async fn test_no_hint_uses_latest_credential() {
        let selector = selector_with(&[
            (ProviderKind::DeepSeek, "sk-deepseek"),
            (ProviderKind::Anthropic, "sk-ant-claude"),
        ])
        .await;

        let resolved = selector.select("alice", None).await.unwrap();
        assert_eq!(resolved.provider, ProviderKind::Anthropic);
        assert_eq!(resolved.secret, "sk-ant-claude");
    }

    #[tokio::test]
    async fn test_missing_hint_falls_back_to_latest() {
        let selector = selector_with(&[
            (ProviderKind::Anthropic, "sk-ant-claude"),
            (ProviderKind::DeepSeek, "sk-deepseek"),
        ])
        .await;

        let resolved = selector.select("alice", Some(ProviderKind::Google)).await.unwrap();
        assert_eq!(resolved.provider, ProviderKind::DeepSeek);
    }

    #[tokio::test]
    async fn test_no_credentials_is_configuration_error() {
        let selector = selector_with(&[]).await;

        let err = selector.select("alice", None).await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));

        let err = selector.select("alice", Some(ProviderKind::Google)).await.unwrap_err();
        assert!(err.to_string().contains("Please configure an API key first"));
    }

    #[tokio::test]
    async fn test_undecryptable_row_is_decode_error() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .upsert_credential("alice", ProviderKind::OpenAI, "not-a-token")
            .await
            .unwrap();
        let selector = CredentialSelector::new(Arc::new(store), CredentialVault::new("k"));

        let err = selector.select("alice", None).await.unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }
}
