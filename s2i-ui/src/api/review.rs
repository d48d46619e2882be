//! Review screen handlers: projection, selection, mutations, undo

use crate::api::{reject, resolve_store};
use crate::error::ApiResult;
use crate::models::FeatureRecord;
use crate::review::{Filters, UndoOutcome};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Serialize)]
pub struct FeatureListResponse {
    /// Features passing the active filters, in cache order
    pub features: Vec<FeatureRecord>,
    pub visible_count: usize,
    pub total_count: usize,
    pub filters: Filters,
    pub selected: Vec<String>,
}

/// GET /api/session/{id}/review/features
pub async fn list_features(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<FeatureListResponse>> {
    let store = resolve_store(&state, &session_id).await?;
    let total_count = store.features().await.len();
    let (features, filters, selection) = state.review.visible(&store).await;
    Ok(Json(FeatureListResponse {
        visible_count: features.len(),
        features,
        total_count,
        filters,
        selected: selection.ids().to_vec(),
    }))
}

/// POST /api/session/{id}/review/reload
///
/// Re-fetch the working set from the converter.
pub async fn reload_features(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<FeatureListResponse>> {
    let store = resolve_store(&state, &session_id).await?;
    if let Err(e) = state.review.reload(&store).await {
        return Err(reject(&state, &session_id, e).await);
    }
    list_features(State(state), Path(session_id)).await
}

/// PUT /api/session/{id}/review/filters
pub async fn set_filters(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(filters): Json<Filters>,
) -> ApiResult<Json<FeatureListResponse>> {
    let store = resolve_store(&state, &session_id).await?;
    store.set_filters(filters).await;
    list_features(State(state), Path(session_id)).await
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub feature_id: String,
    /// Shift/ctrl-click membership toggle
    #[serde(default)]
    pub multi: bool,
}

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub selected: Vec<String>,
}

/// POST /api/session/{id}/review/select
pub async fn toggle_selection(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<SelectRequest>,
) -> ApiResult<Json<SelectionResponse>> {
    let store = resolve_store(&state, &session_id).await?;
    let selection = store
        .toggle_selection(&request.feature_id, request.multi)
        .await;
    Ok(Json(SelectionResponse {
        selected: selection.ids().to_vec(),
    }))
}

/// POST /api/session/{id}/review/deselect
pub async fn deselect_all(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SelectionResponse>> {
    let store = resolve_store(&state, &session_id).await?;
    store.clear_selection().await;
    Ok(Json(SelectionResponse { selected: Vec::new() }))
}

#[derive(Debug, Deserialize)]
pub struct PatchFeatureRequest {
    pub properties: Map<String, Value>,
}

/// PATCH /api/session/{id}/review/features/{feature_id}
pub async fn patch_feature(
    State(state): State<AppState>,
    Path((session_id, feature_id)): Path<(String, String)>,
    Json(request): Json<PatchFeatureRequest>,
) -> ApiResult<Json<FeatureRecord>> {
    let store = resolve_store(&state, &session_id).await?;
    match state
        .review
        .patch_feature(&store, &feature_id, request.properties)
        .await
    {
        Ok(record) => Ok(Json(record)),
        Err(e) => Err(reject(&state, &session_id, e).await),
    }
}

/// DELETE /api/session/{id}/review/features/{feature_id}
pub async fn delete_feature(
    State(state): State<AppState>,
    Path((session_id, feature_id)): Path<(String, String)>,
) -> ApiResult<Json<SelectionResponse>> {
    let store = resolve_store(&state, &session_id).await?;
    if let Err(e) = state.review.delete_feature(&store, &feature_id).await {
        return Err(reject(&state, &session_id, e).await);
    }
    Ok(Json(SelectionResponse { selected: Vec::new() }))
}

#[derive(Debug, Deserialize)]
pub struct BulkPatchRequest {
    pub feature_ids: Vec<String>,
    pub properties: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub affected: usize,
}

/// POST /api/session/{id}/review/bulk/patch
pub async fn bulk_patch(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<BulkPatchRequest>,
) -> ApiResult<Json<BulkResponse>> {
    let store = resolve_store(&state, &session_id).await?;
    match state
        .review
        .bulk_patch(&store, &request.feature_ids, request.properties)
        .await
    {
        Ok(affected) => Ok(Json(BulkResponse { affected })),
        Err(e) => Err(reject(&state, &session_id, e).await),
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub feature_ids: Vec<String>,
}

/// POST /api/session/{id}/review/bulk/delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<BulkDeleteRequest>,
) -> ApiResult<Json<BulkResponse>> {
    let store = resolve_store(&state, &session_id).await?;
    match state.review.bulk_delete(&store, &request.feature_ids).await {
        Ok(affected) => Ok(Json(BulkResponse { affected })),
        Err(e) => Err(reject(&state, &session_id, e).await),
    }
}

#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    pub feature_ids: Vec<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// POST /api/session/{id}/review/bulk/merge
pub async fn merge_units(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<MergeRequest>,
) -> ApiResult<Json<FeatureRecord>> {
    let store = resolve_store(&state, &session_id).await?;
    match state
        .review
        .merge_units(&store, &request.feature_ids, request.display_name.as_deref())
        .await
    {
        Ok(merged) => Ok(Json(merged)),
        Err(e) => Err(reject(&state, &session_id, e).await),
    }
}

#[derive(Debug, Serialize)]
pub struct UndoResponse {
    /// "reverted", "empty", or "feature_gone"
    pub status: &'static str,
    pub feature_id: Option<String>,
    pub history_depth: usize,
}

/// POST /api/session/{id}/review/undo
///
/// Reverse the most recent edit; a no-op (not an error) when there is
/// nothing to undo or the target vanished.
pub async fn undo(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<UndoResponse>> {
    let store = resolve_store(&state, &session_id).await?;
    let outcome = match state.review.undo(&store).await {
        Ok(outcome) => outcome,
        Err(e) => return Err(reject(&state, &session_id, e).await),
    };
    let history_depth = store.history_depth().await;
    let response = match outcome {
        UndoOutcome::Reverted { feature_id } => UndoResponse {
            status: "reverted",
            feature_id: Some(feature_id),
            history_depth,
        },
        UndoOutcome::NothingToUndo => UndoResponse {
            status: "empty",
            feature_id: None,
            history_depth,
        },
        UndoOutcome::FeatureGone { feature_id } => UndoResponse {
            status: "feature_gone",
            feature_id: Some(feature_id),
            history_depth,
        },
    };
    Ok(Json(response))
}

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/api/session/:session_id/review/features", get(list_features))
        .route("/api/session/:session_id/review/reload", post(reload_features))
        .route("/api/session/:session_id/review/filters", put(set_filters))
        .route("/api/session/:session_id/review/select", post(toggle_selection))
        .route("/api/session/:session_id/review/deselect", post(deselect_all))
        .route(
            "/api/session/:session_id/review/features/:feature_id",
            patch(patch_feature).delete(delete_feature),
        )
        .route("/api/session/:session_id/review/bulk/patch", post(bulk_patch))
        .route("/api/session/:session_id/review/bulk/delete", post(bulk_delete))
        .route("/api/session/:session_id/review/bulk/merge", post(merge_units))
        .route("/api/session/:session_id/review/undo", post(undo))
}
