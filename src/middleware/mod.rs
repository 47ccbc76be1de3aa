//! Middleware module
//!
//! Caller identity resolution and request logging

pub mod auth;
pub mod logging;

pub use auth::{AdminIdentity, HeaderIdentity, Identity, IdentityResolver};
pub use logging::request_logging_middleware;
