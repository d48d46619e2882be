//! Validation and export handlers
//!
//! Export is a two-step handshake: `request` opens the confirmation
//! only when the last validation is error-free (409 with the blocked
//! condition otherwise), and `confirm` streams the archive back with
//! the converter's suggested filename.

use crate::api::{reject, resolve_store};
use crate::error::ApiResult;
use crate::export::ExportTicket;
use crate::models::{AutofixOutcome, ValidationReport};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

/// POST /api/session/{id}/validate
pub async fn validate(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<ValidationReport>> {
    let store = resolve_store(&state, &session_id).await?;
    match state.export.validate(&store).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => Err(reject(&state, &session_id, e).await),
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct AutofixRequest {
    /// Apply destructive (confirmation-required) fixes too
    #[serde(default)]
    pub apply_destructive: bool,
}

/// POST /api/session/{id}/autofix
pub async fn autofix(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<AutofixRequest>,
) -> ApiResult<Json<AutofixOutcome>> {
    let store = resolve_store(&state, &session_id).await?;
    match state.export.autofix(&store, request.apply_destructive).await {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => Err(reject(&state, &session_id, e).await),
    }
}

/// POST /api/session/{id}/export/request
pub async fn request_export(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<ExportTicket>> {
    let store = resolve_store(&state, &session_id).await?;
    match state.export.request_export(&store).await {
        Ok(ticket) => Ok(Json(ticket)),
        Err(e) => Err(reject(&state, &session_id, e).await),
    }
}

/// POST /api/session/{id}/export/confirm
///
/// Fetch the archive and stream it to the browser.
pub async fn confirm_export(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Response> {
    let store = resolve_store(&state, &session_id).await?;
    let archive = match state.export.confirm_export(&store).await {
        Ok(archive) => archive,
        Err(e) => return Err(reject(&state, &session_id, e).await),
    };

    let disposition = format!("attachment; filename=\"{}\"", archive.filename);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive.bytes,
    )
        .into_response())
}

pub fn export_routes() -> Router<AppState> {
    Router::new()
        .route("/api/session/:session_id/validate", post(validate))
        .route("/api/session/:session_id/autofix", post(autofix))
        .route("/api/session/:session_id/export/request", post(request_export))
        .route("/api/session/:session_id/export/confirm", post(confirm_export))
}
