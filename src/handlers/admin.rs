//! Administrator handlers
//!
//! Read-only views across all users. Callers must hold the administrator role.

use crate::handlers::{path_param, AppState};
use crate::middleware::{auth::validate_user_id, AdminIdentity};
use crate::models::admin::{AdminStats, UserEntries, UserList};
use crate::utils::error::{helpers, AppResult};
use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use std::sync::Arc;
use tracing::info;

/// GET /api/admin/users
///
/// Administrators are left out of the listing. The entry total covers everyone.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    admin: AdminIdentity,
) -> AppResult<Json<UserList>> {
    let users: Vec<_> = state
        .entries
        .list_users()
        .await?
        .into_iter()
        .filter(|user| !state.identity.is_admin(&user.user_id))
        .collect();
    let total_entries = state.entries.count_entries().await?;

    info!(admin = %admin.0, users = users.len(), "Admin listed users");
    Ok(Json(UserList {
        success: true,
        stats: AdminStats {
            total_users: users.len(),
            total_entries,
        },
        users,
    }))
}

/// GET /api/admin/users/:user_id/entries
pub async fn user_entries(
    State(state): State<Arc<AppState>>,
    admin: AdminIdentity,
    user_id: Result<Path<String>, PathRejection>,
) -> AppResult<Json<UserEntries>> {
    let raw = path_param(user_id)?;
    let user_id = validate_user_id(&raw)
        .ok_or_else(|| helpers::validation_error("Invalid user id"))?
        .to_string();

    if !state.entries.user_exists(&user_id).await? {
        return Err(helpers::not_found_error(format!("user {}", user_id)));
    }

    let entries = state.entries.list_entries(&user_id).await?;
    info!(admin = %admin.0, user_id = %user_id, count = entries.len(), "Admin viewed entries");
    Ok(Json(UserEntries {
        success: true,
        user_id,
        entries,
    }))
}
