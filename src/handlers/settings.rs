//! Provider key settings handlers

use crate::handlers::{json_body, parse_provider, path_param, AppState};
use crate::middleware::Identity;
use crate::models::credential::{ApiKeyList, ApiKeyStatus, SaveApiKeyRequest};
use crate::models::MessageResponse;
use crate::utils::error::AppResult;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use std::sync::Arc;

/// GET /api/settings/keys
pub async fn list_keys(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> AppResult<Json<ApiKeyList>> {
    Ok(Json(state.keys.list_keys(identity.user_id()).await?))
}

/// GET /api/settings/keys/:provider
///
/// Returns the masked key only.
pub async fn get_key(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    provider: Result<Path<String>, PathRejection>,
) -> AppResult<Json<ApiKeyStatus>> {
    let provider = parse_provider(&path_param(provider)?)?;
    Ok(Json(state.keys.get_key(identity.user_id(), provider).await?))
}

/// PUT /api/settings/keys/:provider
pub async fn save_key(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    provider: Result<Path<String>, PathRejection>,
    body: Result<Json<SaveApiKeyRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let provider = parse_provider(&path_param(provider)?)?;
    let request = json_body(body)?;
    Ok(Json(
        state
            .keys
            .save_key(identity.user_id(), provider, &request.api_key)
            .await?,
    ))
}

/// DELETE /api/settings/keys/:provider
pub async fn delete_key(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    provider: Result<Path<String>, PathRejection>,
) -> AppResult<Json<MessageResponse>> {
    let provider = parse_provider(&path_param(provider)?)?;
    Ok(Json(state.keys.delete_key(identity.user_id(), provider).await?))
}
