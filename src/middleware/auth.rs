//! Caller identity
//!
//! Login and sessions live in front of this service. The service only
//! trusts an identity header set by that layer. Journal operations are
//! scoped to the resolved user id. Admin routes also need the admin role.

use crate::handlers::AppState;
use crate::utils::error::{helpers, AppError, AppResult};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, HeaderName},
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Longest accepted user id
pub const MAX_USER_ID_LEN: usize = 128;

/// Maps request headers to a user id
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> AppResult<String>;

    /// Whether a resolved user holds the administrator role
    fn is_admin(&self, user_id: &str) -> bool;
}

/// Reads the user id from a trusted header
#[derive(Debug, Clone)]
pub struct HeaderIdentity {
    header: HeaderName,
    admins: HashSet<String>,
}

impl HeaderIdentity {
    pub fn new(header: &str) -> AppResult<Self> {
        let header = HeaderName::from_bytes(header.trim().to_ascii_lowercase().as_bytes())
            .map_err(|e| {
                AppError::Config(anyhow::anyhow!("Invalid identity header {:?}: {}", header, e))
            })?;
        Ok(Self {
            header,
            admins: HashSet::new(),
        })
    }

    /// Grant the administrator role to these user ids
    pub fn with_admins<I>(mut self, admins: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.admins
            .extend(admins.into_iter().filter_map(|id| validate_user_id(&id).map(str::to_string)));
        self
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }
}

impl IdentityResolver for HeaderIdentity {
    fn resolve(&self, headers: &HeaderMap) -> AppResult<String> {
        let Some(value) = headers.get(&self.header) else {
            warn!("Missing identity header: {}", self.header);
            return Err(helpers::auth_error("missing user identity"));
        };

        let raw = value
            .to_str()
            .map_err(|_| helpers::auth_error("user identity is not valid text"))?;

        validate_user_id(raw)
            .map(str::to_string)
            .ok_or_else(|| helpers::auth_error("invalid user identity"))
    }

    fn is_admin(&self, user_id: &str) -> bool {
        self.admins.contains(user_id)
    }
}

/// Trimmed user id if it is non-empty, short enough and free of control characters
pub fn validate_user_id(raw: &str) -> Option<&str> {
    let id = raw.trim();
    if id.is_empty() || id.chars().count() > MAX_USER_ID_LEN || id.chars().any(char::is_control) {
        return None;
    }
    Some(id)
}

/// Resolved caller, extracted per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub String);

impl Identity {
    pub fn user_id(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user_id = state.identity.resolve(&parts.headers)?;
        debug!("Resolved caller identity");
        Ok(Identity(user_id))
    }
}

/// Resolved caller holding the administrator role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity(pub String);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Identity(user_id) = Identity::from_request_parts(parts, state).await?;
        if !state.identity.is_admin(&user_id) {
            warn!("Non-admin caller rejected from admin route");
            return Err(helpers::forbidden_error("administrator role required"));
        }
        Ok(AdminIdentity(user_id))
    }
}
