//! File classification handlers
//!
//! Classification edits round-trip through the converter; the local
//! file list is replaced with the echoed list on success. A manual
//! type change may surface a learning suggestion, held in the store
//! until accepted or dismissed.

use crate::api::{reject_service, resolve_store};
use crate::error::{ApiError, ApiResult};
use crate::models::{ImportedFile, LearningSuggestion};
use crate::services::FilePatch;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct FilesResponse {
    pub files: Vec<ImportedFile>,
    pub learning_suggestion: Option<LearningSuggestion>,
}

/// GET /api/session/{id}/files
pub async fn get_files(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<FilesResponse>> {
    let store = resolve_store(&state, &session_id).await?;
    Ok(Json(FilesResponse {
        files: store.files().await,
        learning_suggestion: store.learning_suggestion().await,
    }))
}

/// POST /api/session/{id}/files/detect
///
/// Re-run keyword detection over every file.
pub async fn detect_all(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<FilesResponse>> {
    let store = resolve_store(&state, &session_id).await?;
    let files = match state.files_api.detect_all(&session_id).await {
        Ok(files) => files,
        Err(e) => return Err(reject_service(&state, &session_id, e).await),
    };
    store.set_files(files.clone()).await;
    Ok(Json(FilesResponse {
        files,
        learning_suggestion: store.learning_suggestion().await,
    }))
}

#[derive(Debug, Deserialize)]
pub struct PatchFileRequest {
    #[serde(default)]
    pub detected_type: Option<String>,
    #[serde(default)]
    pub detected_level: Option<i32>,
    #[serde(default)]
    pub level_name: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub outdoor: Option<bool>,
    #[serde(default)]
    pub level_category: Option<String>,
}

/// PATCH /api/session/{id}/files/{stem}
pub async fn patch_file(
    State(state): State<AppState>,
    Path((session_id, stem)): Path<(String, String)>,
    Json(request): Json<PatchFileRequest>,
) -> ApiResult<Json<FilesResponse>> {
    let store = resolve_store(&state, &session_id).await?;
    let patch = FilePatch {
        detected_type: request.detected_type,
        detected_level: request.detected_level,
        level_name: request.level_name,
        short_name: request.short_name,
        outdoor: request.outdoor,
        level_category: request.level_category,
        ..Default::default()
    };

    let outcome = match state.files_api.patch_file(&session_id, &stem, &patch).await {
        Ok(outcome) => outcome,
        Err(e) => return Err(reject_service(&state, &session_id, e).await),
    };

    store.set_files(outcome.files.clone()).await;
    store
        .set_learning_suggestion(outcome.learning_suggestion.clone())
        .await;
    Ok(Json(FilesResponse {
        files: outcome.files,
        learning_suggestion: outcome.learning_suggestion,
    }))
}

/// POST /api/session/{id}/files/learning/accept
///
/// Accept the pending suggestion: the keyword joins the session's
/// learned set and detection re-runs over the affected files.
pub async fn accept_learning(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<FilesResponse>> {
    let store = resolve_store(&state, &session_id).await?;
    let suggestion = store
        .take_learning_suggestion()
        .await
        .ok_or_else(|| ApiError::NotFound("no pending learning suggestion".to_string()))?;

    let patch = FilePatch {
        detected_type: Some(suggestion.feature_type.clone()),
        apply_learning: true,
        learning_keyword: Some(suggestion.keyword.clone()),
        ..Default::default()
    };
    let outcome = match state
        .files_api
        .patch_file(&session_id, &suggestion.source_stem, &patch)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            // The converter never saw the acceptance; restore the offer.
            store.set_learning_suggestion(Some(suggestion)).await;
            return Err(reject_service(&state, &session_id, e).await);
        }
    };

    store.set_files(outcome.files.clone()).await;
    Ok(Json(FilesResponse {
        files: outcome.files,
        learning_suggestion: None,
    }))
}

/// POST /api/session/{id}/files/learning/dismiss
pub async fn dismiss_learning(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<FilesResponse>> {
    let store = resolve_store(&state, &session_id).await?;
    store.take_learning_suggestion().await;
    Ok(Json(FilesResponse {
        files: store.files().await,
        learning_suggestion: None,
    }))
}

pub fn files_routes() -> Router<AppState> {
    Router::new()
        .route("/api/session/:session_id/files", get(get_files))
        .route("/api/session/:session_id/files/detect", post(detect_all))
        .route("/api/session/:session_id/files/:stem", patch(patch_file))
        .route(
            "/api/session/:session_id/files/learning/accept",
            post(accept_learning),
        )
        .route(
            "/api/session/:session_id/files/learning/dismiss",
            post(dismiss_learning),
        )
}
