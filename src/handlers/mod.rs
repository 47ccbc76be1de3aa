//! HTTP handlers module
//!
//! Contains all HTTP endpoint handling logic

pub mod admin;
pub mod ai;
pub mod entries;
pub mod health;
pub mod settings;

use crate::config::{SecurityConfig, Settings};
use crate::middleware::{request_logging_middleware, HeaderIdentity, IdentityResolver};
use crate::models::provider::ProviderKind;
use crate::providers::{CompletionClient, ProviderClient};
use crate::services::{
    AssistantService, CredentialSelector, CredentialStore, CredentialVault, EntryStore,
    KeyService, SqliteStore,
};
use crate::utils::error::{helpers, AppError, AppResult, ErrorContext};
use anyhow::Result;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub keys: KeyService,
    pub entries: Arc<dyn EntryStore>,
    pub assistant: AssistantService,
    pub identity: Arc<dyn IdentityResolver>,
}

impl AppState {
    /// Wire services from explicit components
    pub fn new(
        settings: Settings,
        credentials: Arc<dyn CredentialStore>,
        entries: Arc<dyn EntryStore>,
        ai: Arc<dyn CompletionClient>,
    ) -> AppResult<Self> {
        let vault = CredentialVault::new(&settings.vault.master_key);
        let selector = CredentialSelector::new(Arc::clone(&credentials), vault.clone());
        let identity = HeaderIdentity::new(&settings.security.identity_header)?
            .with_admins(settings.security.admin_users.iter().cloned());

        Ok(Self {
            keys: KeyService::new(credentials, vault),
            assistant: AssistantService::new(selector, Arc::clone(&entries), ai),
            entries,
            identity: Arc::new(identity),
            settings,
        })
    }

    /// Open the configured database and build the HTTP provider client
    pub fn from_settings(settings: Settings) -> AppResult<Self> {
        let store = Arc::new(SqliteStore::open(&settings.database.path)?);
        let ai = ProviderClient::new(settings.providers.clone())?;
        Self::new(settings, store.clone(), store, Arc::new(ai))
    }
}

/// Unwrap a JSON body, reporting malformed input with the standard error body
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// Unwrap path parameters, reporting bad segments with the standard error body
pub(crate) fn path_param<T>(path: Result<Path<T>, PathRejection>) -> AppResult<T> {
    path.map(|Path(value)| value).validation_context("Invalid path parameter")
}

/// Parse a provider id from a path segment
pub(crate) fn parse_provider(raw: &str) -> AppResult<ProviderKind> {
    raw.parse::<ProviderKind>()
        .map_err(|e| helpers::validation_error(e.to_string()))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins = if security.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = security
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

/// Create application router
pub async fn create_router(settings: Settings) -> Result<Router> {
    let state = AppState::from_settings(settings)?;
    info!("Application state initialized");
    Ok(router_with_state(Arc::new(state)))
}

/// Build the router around an existing state
pub fn router_with_state(state: Arc<AppState>) -> Router {
    let cors_enabled = state.settings.security.cors_enabled;
    let cors = cors_layer(&state.settings.security);

    let api = Router::new()
        .route("/api/settings/keys", get(settings::list_keys))
        .route(
            "/api/settings/keys/:provider",
            get(settings::get_key)
                .put(settings::save_key)
                .delete(settings::delete_key),
        )
        .route("/api/entries", get(entries::list_entries).post(entries::create_entry))
        .route("/api/entries/:id", delete(entries::delete_entry))
        .route("/api/ai/enhance", post(ai::enhance))
        .route("/api/ai/report", post(ai::report))
        .route("/api/ai/analyze", post(ai::analyze))
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/:user_id/entries", get(admin::user_entries))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .with_state(state);

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));

    let router = api.layer(middleware_stack);
    if cors_enabled {
        router.layer(cors)
    } else {
        router
    }
}
