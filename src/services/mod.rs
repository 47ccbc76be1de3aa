//! Service layer module
//!
//! Contains the credential vault, persistence, credential selection, key
//! management and the AI assistant

pub mod assistant;
pub mod keys;
pub mod prompts;
pub mod selector;
pub mod store;
pub mod vault;

pub use assistant::AssistantService;
pub use keys::KeyService;
pub use selector::CredentialSelector;
pub use store::{CredentialStore, EntryStore, SqliteStore};
pub use vault::{mask, CredentialVault, VaultError};
