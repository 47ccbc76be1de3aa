//! Journal entry handlers

use crate::handlers::{json_body, path_param, AppState};
use crate::middleware::Identity;
use crate::models::entry::{EntryList, EntryResponse, NewEntry};
use crate::models::MessageResponse;
use crate::utils::error::{helpers, AppResult};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use std::sync::Arc;
use tracing::info;

/// GET /api/entries
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> AppResult<Json<EntryList>> {
    let entries = state.entries.list_entries(identity.user_id()).await?;
    Ok(Json(EntryList {
        success: true,
        entries,
    }))
}

/// POST /api/entries
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    body: Result<Json<NewEntry>, JsonRejection>,
) -> AppResult<Json<EntryResponse>> {
    let new_entry = json_body(body)?;
    new_entry.validate().map_err(helpers::validation_error)?;

    let entry = state.entries.create_entry(identity.user_id(), new_entry).await?;
    info!(entry_id = entry.id, "Entry created");
    Ok(Json(EntryResponse {
        success: true,
        entry,
    }))
}

/// DELETE /api/entries/:id
///
/// Only the caller's own entries can be removed.
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<MessageResponse>> {
    let id = path_param(id)?;
    if !state.entries.delete_entry(identity.user_id(), id).await? {
        return Err(helpers::not_found_error(format!("entry {}", id)));
    }
    info!(entry_id = id, "Entry deleted");
    Ok(Json(MessageResponse::ok("Entry deleted")))
}
