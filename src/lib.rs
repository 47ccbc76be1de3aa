//! Work journal service library
//!
//! Per-user encrypted AI provider credentials, a single calling convention
//! over several AI providers, and the journal and assistant features built
//! on top of them

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod providers;
pub mod services;
pub mod utils;

// Re-export common types
pub use config::Settings;
pub use handlers::{create_router, router_with_state, AppState};
pub use models::provider::ProviderKind;
pub use providers::{CompletionClient, ProviderClient, ProviderError, ProviderRequest};
pub use services::{mask, CredentialVault, VaultError};
pub use utils::error::{AppError, AppResult};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
