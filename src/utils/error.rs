//! Error handling module
//!
//! Defines error types and handling logic used in the project

use crate::providers::ProviderError;
use crate::services::vault::VaultError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Startup or settings error
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// No usable credential for the requested provider
    #[error("Please configure an API key first: {0}")]
    Configuration(String),

    /// Upstream AI provider failure, message already carries the provider name
    #[error("{0}")]
    Upstream(String),

    /// Stored credential cannot be decrypted
    #[error("Stored credential is unreadable, please save it again: {0}")]
    Decode(String),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Caller is authenticated but lacks the required role
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Request validation failed
    #[error("Request validation failed: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Database error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error type
    #[serde(rename = "type")]
    pub error_type: String,
    /// Error message
    pub message: String,
}

impl AppError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) | AppError::Configuration(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Decode(_)
            | AppError::Storage(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Authentication(_) => "authentication_error",
            AppError::Forbidden(_) => "permission_error",
            AppError::Validation(_) => "invalid_request_error",
            AppError::Configuration(_) => "configuration_error",
            AppError::NotFound(_) => "not_found_error",
            AppError::Upstream(_) => "api_error",
            AppError::Decode(_) => "decode_error",
            AppError::Config(_) | AppError::Storage(_) | AppError::Internal(_) => "internal_error",
        }
    }

    /// Whether detailed error information should be logged
    pub fn should_log_details(&self) -> bool {
        !matches!(self, AppError::Authentication(_))
    }

    /// Convert to the JSON error body
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            error: ErrorBody {
                error_type: self.error_type().to_string(),
                message: self.to_string(),
            },
        }
    }
}

impl From<VaultError> for AppError {
    fn from(err: VaultError) -> Self {
        match err {
            VaultError::Decode(msg) => AppError::Decode(msg),
            VaultError::Encrypt(msg) => AppError::Internal(msg),
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Upstream { .. } => AppError::Upstream(err.to_string()),
            ProviderError::InvalidRequest(msg) => AppError::Validation(msg),
            ProviderError::Client(msg) => AppError::Internal(msg),
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Blocking task failed: {}", err))
    }
}

/// Implement IntoResponse trait to allow errors to be returned directly as HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if !self.should_log_details() {
            tracing::warn!("Client error: {} - Status code: {}", self.error_type(), status);
        } else if status.is_server_error() {
            tracing::error!("Application error: {} - Status code: {}", self, status);
        } else {
            tracing::warn!("Request rejected: {} - Status code: {}", self, status);
        }

        (status, Json(self.to_error_response())).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Error handling helper functions
pub mod helpers {
    use super::*;

    /// Create authentication error
    pub fn auth_error(message: impl Into<String>) -> AppError {
        AppError::Authentication(message.into())
    }

    /// Create validation error
    pub fn validation_error(message: impl Into<String>) -> AppError {
        AppError::Validation(message.into())
    }

    /// Create not found error
    pub fn not_found_error(message: impl Into<String>) -> AppError {
        AppError::NotFound(message.into())
    }

    /// Create permission error
    pub fn forbidden_error(message: impl Into<String>) -> AppError {
        AppError::Forbidden(message.into())
    }
}

/// Error context extension trait
pub trait ErrorContext<T> {
    /// Add validation error context
    fn validation_context(self, message: &str) -> AppResult<T>;

    /// Add internal error context
    fn internal_context(self, message: &str) -> AppResult<T>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn validation_context(self, message: &str) -> AppResult<T> {
        self.map_err(|e| AppError::Validation(format!("{}: {}", message, e)))
    }

    fn internal_context(self, message: &str) -> AppResult<T> {
        self.map_err(|e| AppError::Internal(format!("{}: {}", message, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::provider::ProviderKind;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::Authentication("test".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Forbidden("test".to_string()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Validation("test".to_string()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Configuration("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NotFound("test".to_string()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Upstream("test".to_string()).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            AppError::Decode("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_provider_error_conversion_keeps_message() {
        let err = ProviderError::Upstream {
            provider: ProviderKind::OpenAI,
            status: Some(401),
            message: "bad key".to_string(),
        };
        let app_error: AppError = err.into();

        assert!(matches!(app_error, AppError::Upstream(_)));
        assert_eq!(app_error.to_string(), "OpenAI API call failed: bad key");
    }

    #[test]
    fn test_vault_error_conversion() {
        let app_error: AppError = VaultError::Decode("missing delimiter".to_string()).into();
        assert!(matches!(app_error, AppError::Decode(_)));
        assert_eq!(app_error.error_type(), "decode_error");
    }

    #[test]
    fn test_error_context() {
        let result: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));

        let app_result = result.validation_context("Failed to read entry");

        if let Err(AppError::Validation(msg)) = app_result {
            assert!(msg.contains("Failed to read entry"));
            assert!(msg.contains("file not found"));
        } else {
            panic!("Expected validation error");
        }
    }
}
