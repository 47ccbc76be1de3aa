//! Application configuration settings
//!
//! Defines all configuration structures and loading logic

use crate::models::provider::ProviderKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Master secret used when `ENCRYPTION_KEY` is unset outside production.
pub const DEV_FALLBACK_ENCRYPTION_KEY: &str = "worklog-dev-only-encryption-key";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Credential vault configuration
    pub vault: VaultConfig,
    /// Upstream AI provider configuration
    pub providers: ProvidersConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path (`:memory:` for an ephemeral database)
    pub path: String,
}

/// Credential vault configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Master secret the encryption key is derived from
    #[serde(skip_serializing, default)]
    pub master_key: String,
    /// Whether the development fallback secret is in use
    pub using_fallback_key: bool,
}

impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("master_key", &"[redacted]")
            .field("using_fallback_key", &self.using_fallback_key)
            .finish()
    }
}

/// Single upstream endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// API base URL (path segments are appended per provider)
    pub base_url: String,
    /// Model identifier sent upstream
    pub model: String,
}

impl EndpointConfig {
    fn new(base_url: &str, model: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            model: model.to_string(),
        }
    }
}

/// Upstream AI provider configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Outbound request timeout in seconds
    pub timeout: u64,
    pub anthropic: EndpointConfig,
    pub openai: EndpointConfig,
    pub google: EndpointConfig,
    /// Used when a user's stored Ollama endpoint is empty
    pub ollama: EndpointConfig,
    pub deepseek: EndpointConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout: 60,
            anthropic: EndpointConfig::new(
                "https://api.anthropic.com/v1",
                "claude-3-5-sonnet-20241022",
            ),
            openai: EndpointConfig::new("https://api.openai.com/v1", "gpt-4-turbo-preview"),
            google: EndpointConfig::new(
                "https://generativelanguage.googleapis.com/v1",
                "gemini-1.5-flash",
            ),
            ollama: EndpointConfig::new("http://localhost:11434", "llama2"),
            deepseek: EndpointConfig::new("https://api.deepseek.com/v1", "deepseek-chat"),
        }
    }
}

impl ProvidersConfig {
    /// Get the endpoint for a provider
    pub fn endpoint(&self, provider: ProviderKind) -> &EndpointConfig {
        match provider {
            ProviderKind::Anthropic => &self.anthropic,
            ProviderKind::OpenAI => &self.openai,
            ProviderKind::Google => &self.google,
            ProviderKind::Ollama => &self.ollama,
            ProviderKind::DeepSeek => &self.deepseek,
        }
    }

    fn endpoint_mut(&mut self, provider: ProviderKind) -> &mut EndpointConfig {
        match provider {
            ProviderKind::Anthropic => &mut self.anthropic,
            ProviderKind::OpenAI => &mut self.openai,
            ProviderKind::Google => &mut self.google,
            ProviderKind::Ollama => &mut self.ollama,
            ProviderKind::DeepSeek => &mut self.deepseek,
        }
    }
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Allowed origins for CORS
    pub allowed_origins: Vec<String>,
    /// Header carrying the authenticated user id, set by the auth gateway
    pub identity_header: String,
    /// Whether CORS is enabled
    pub cors_enabled: bool,
    /// User ids allowed on the admin routes
    pub admin_users: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Settings {
    /// Create a new configuration instance from the process environment
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let is_production = get("APP_ENV", "development").eq_ignore_ascii_case("production");
        let vault = match lookup("ENCRYPTION_KEY").filter(|k| !k.is_empty()) {
            Some(master_key) => VaultConfig {
                master_key,
                using_fallback_key: false,
            },
            None if is_production => {
                anyhow::bail!("ENCRYPTION_KEY environment variable must be set in production")
            }
            None => VaultConfig {
                master_key: DEV_FALLBACK_ENCRYPTION_KEY.to_string(),
                using_fallback_key: true,
            },
        };

        let mut providers = ProvidersConfig {
            timeout: get("PROVIDER_TIMEOUT", "60")
                .parse()
                .context("Invalid provider timeout")?,
            ..ProvidersConfig::default()
        };
        for kind in ProviderKind::ALL {
            let prefix = kind.env_prefix();
            let endpoint = providers.endpoint_mut(kind);
            if let Some(base_url) = lookup(&format!("{}_BASE_URL", prefix)) {
                endpoint.base_url = base_url;
            }
            if let Some(model) = lookup(&format!("{}_MODEL", prefix)) {
                endpoint.model = model;
            }
        }

        let settings = Self {
            server: ServerConfig {
                host: get("SERVER_HOST", "0.0.0.0"),
                port: get("SERVER_PORT", "8080")
                    .parse()
                    .context("Invalid port number")?,
            },
            database: DatabaseConfig {
                path: get("DATABASE_PATH", "worklog.db"),
            },
            vault,
            providers,
            security: SecurityConfig {
                allowed_origins: get("ALLOWED_ORIGINS", "*")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                identity_header: get("IDENTITY_HEADER", "x-user-id").to_lowercase(),
                cors_enabled: get("CORS_ENABLED", "true")
                    .parse()
                    .context("Invalid CORS enabled flag")?,
                admin_users: get("ADMIN_USERS", "")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            logging: LoggingConfig {
                level: get("RUST_LOG", "info"),
                format: get("LOG_FORMAT", "text"),
            },
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Port number cannot be 0");
        }

        if self.database.path.trim().is_empty() {
            anyhow::bail!("Database path cannot be empty");
        }

        if self.vault.master_key.is_empty() {
            anyhow::bail!("Encryption key cannot be empty");
        }

        if self.providers.timeout == 0 {
            anyhow::bail!("Timeout values cannot be 0");
        }

        for kind in ProviderKind::ALL {
            let endpoint = self.providers.endpoint(kind);
            if !endpoint.base_url.starts_with("http") {
                anyhow::bail!(
                    "Invalid {} base URL format, should start with 'http'",
                    kind
                );
            }
            if endpoint.model.trim().is_empty() {
                anyhow::bail!("Model for {} cannot be empty", kind);
            }
        }

        if self.security.identity_header.is_empty()
            || axum::http::HeaderName::from_bytes(self.security.identity_header.as_bytes()).is_err()
        {
            anyhow::bail!("Invalid identity header: {}", self.security.identity_header);
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }

    /// Whether the development fallback encryption key is in use
    pub fn is_dev_mode(&self) -> bool {
        self.vault.using_fallback_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[("ENCRYPTION_KEY", "secret")])).unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.database.path, "worklog.db");
        assert_eq!(settings.providers.timeout, 60);
        assert_eq!(settings.providers.anthropic.model, "claude-3-5-sonnet-20241022");
        assert_eq!(settings.providers.ollama.base_url, "http://localhost:11434");
        assert_eq!(settings.security.identity_header, "x-user-id");
        assert!(!settings.is_dev_mode());
    }

    #[test]
    fn test_provider_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("ENCRYPTION_KEY", "secret"),
            ("DEEPSEEK_BASE_URL", "http://127.0.0.1:9000/v1"),
            ("OPENAI_MODEL", "gpt-4o"),
        ]))
        .unwrap();

        assert_eq!(settings.providers.deepseek.base_url, "http://127.0.0.1:9000/v1");
        assert_eq!(settings.providers.endpoint(ProviderKind::OpenAI).model, "gpt-4o");
    }

    #[test]
    fn test_fallback_key_refused_in_production() {
        let result = Settings::from_lookup(lookup_from(&[("APP_ENV", "production")]));
        assert!(result.is_err());

        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert!(settings.is_dev_mode());
        assert_eq!(settings.vault.master_key, DEV_FALLBACK_ENCRYPTION_KEY);
    }

    #[test]
    fn test_debug_redacts_master_key() {
        let settings =
            Settings::from_lookup(lookup_from(&[("ENCRYPTION_KEY", "top-secret-value")])).unwrap();
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("top-secret-value"));
        assert!(debug.contains("[redacted]"));
    }
}
