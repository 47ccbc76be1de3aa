//! AI assistant handlers

use crate::handlers::{json_body, AppState};
use crate::middleware::Identity;
use crate::models::assistant::{
    AnalyzeRequest, AnalyzeResponse, EnhanceRequest, EnhanceResponse, ReportRequest,
    ReportResponse,
};
use crate::utils::error::AppResult;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

/// POST /api/ai/enhance
pub async fn enhance(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    body: Result<Json<EnhanceRequest>, JsonRejection>,
) -> AppResult<Json<EnhanceResponse>> {
    let request = json_body(body)?;
    Ok(Json(state.assistant.enhance(identity.user_id(), request).await?))
}

/// POST /api/ai/report
pub async fn report(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    body: Result<Json<ReportRequest>, JsonRejection>,
) -> AppResult<Json<ReportResponse>> {
    let request = json_body(body)?;
    Ok(Json(state.assistant.weekly_report(identity.user_id(), request).await?))
}

/// POST /api/ai/analyze
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> AppResult<Json<AnalyzeResponse>> {
    let request = json_body(body)?;
    Ok(Json(state.assistant.analyze(identity.user_id(), request).await?))
}
