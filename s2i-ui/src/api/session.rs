//! Session lifecycle handlers
//!
//! The browser uploads source files directly to the converter and
//! receives a session id; opening that id here builds the local store
//! (files + wizard state fetched up front). Closing tears the store
//! down; nothing survives it.

use crate::api::{reject_service, resolve_store};
use crate::error::{ApiError, ApiResult};
use crate::export::ExportPhase;
use crate::models::{GenerationStatus, ImportedFile, ValidationSummary};
use crate::review::Filters;
use crate::session::store::SessionStore;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use s2i_common::StudioEvent;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub current_step: u8,
    pub current_step_name: String,
    pub file_count: usize,
    pub feature_count: usize,
    pub selected: Vec<String>,
    pub filters: Filters,
    pub export_phase: ExportPhase,
    pub generation_status: GenerationStatus,
    pub history_depth: usize,
    pub validation_summary: Option<ValidationSummary>,
}

async fn snapshot_of(store: &SessionStore) -> SessionSnapshot {
    let state = store.snapshot().await;
    let step = state.current_step.unwrap_or_else(crate::wizard::WizardStep::first);
    SessionSnapshot {
        session_id: store.session_id().to_string(),
        current_step: step.index(),
        current_step_name: step.title().to_string(),
        file_count: state.files.len(),
        feature_count: state.features.len(),
        selected: state.selection.ids().to_vec(),
        filters: state.filters,
        export_phase: state.export_phase,
        generation_status: state.wizard.generation_status,
        history_depth: state.history.depth(),
        validation_summary: state.validation.map(|report| report.summary),
    }
}

/// POST /api/session
///
/// Open a converter session: fetch its file list and wizard state and
/// initialize the local store. Re-opening an id replaces any stale
/// store for it.
pub async fn open_session(
    State(state): State<AppState>,
    Json(request): Json<OpenSessionRequest>,
) -> ApiResult<(StatusCode, Json<SessionSnapshot>)> {
    let session_id = request.session_id.trim().to_string();
    if Uuid::parse_str(&session_id).is_err() {
        return Err(ApiError::BadRequest(format!(
            "'{}' is not a valid session id",
            session_id
        )));
    }

    let files: Vec<ImportedFile> = match state.files_api.list_files(&session_id).await {
        Ok(files) => files,
        Err(e) => return Err(reject_service(&state, &session_id, e).await),
    };
    let wizard = match state.wizard_api.get_wizard(&session_id).await {
        Ok(wizard) => wizard,
        Err(e) => return Err(reject_service(&state, &session_id, e).await),
    };

    let file_count = files.len();
    let store = Arc::new(SessionStore::new(
        session_id.clone(),
        files,
        wizard,
        state.event_bus.clone(),
    ));
    state.sessions.insert(store.clone()).await;

    state.event_bus.emit(StudioEvent::SessionOpened {
        session_id: session_id.clone(),
        file_count,
        timestamp: Utc::now(),
    });
    tracing::info!(session_id = %session_id, files = file_count, "Session opened");

    Ok((StatusCode::CREATED, Json(snapshot_of(&store).await)))
}

/// GET /api/session/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SessionSnapshot>> {
    let store = resolve_store(&state, &session_id).await?;
    Ok(Json(snapshot_of(&store).await))
}

/// DELETE /api/session/{id}
///
/// Logout/teardown: every session-scoped slice is reset before the
/// store is dropped.
pub async fn close_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.sessions.close(&session_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::SessionExpired(format!(
            "no open session '{}'",
            session_id
        )))
    }
}

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/session", post(open_session))
        .route("/api/session/:session_id", get(get_session).delete(close_session))
}
