//! Wizard handlers: section patches and gated navigation
//!
//! Navigation outcomes (including refusals and redirects) are normal
//! 200 responses carrying the step and reason; they are client-side
//! precondition results, not errors.

use crate::api::{reject, reject_service, resolve_store};
use crate::error::{ApiError, ApiResult};
use crate::models::{BuildingInfo, LevelItem, ProjectInfo, WizardState};
use crate::services::{AddressCandidate, MappingsPatch};
use crate::wizard::{Navigation, WizardStep};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct WizardResponse {
    pub wizard: WizardState,
    pub current_step: u8,
}

async fn wizard_response(store: &crate::session::store::SessionStore) -> WizardResponse {
    WizardResponse {
        wizard: store.wizard().await,
        current_step: store.current_step().await.index(),
    }
}

/// GET /api/session/{id}/wizard
pub async fn get_wizard(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<WizardResponse>> {
    let store = resolve_store(&state, &session_id).await?;
    Ok(Json(wizard_response(&store).await))
}

macro_rules! section_handler {
    ($name:ident, $body:ty, $method:ident) => {
        pub async fn $name(
            State(state): State<AppState>,
            Path(session_id): Path<String>,
            Json(body): Json<$body>,
        ) -> ApiResult<Json<WizardResponse>> {
            let store = resolve_store(&state, &session_id).await?;
            let wizard = match state.wizard_api.$method(&session_id, &body).await {
                Ok(wizard) => wizard,
                Err(e) => return Err(reject_service(&state, &session_id, e).await),
            };
            store.set_wizard(wizard).await;
            Ok(Json(wizard_response(&store).await))
        }
    };
}

section_handler!(patch_project, ProjectInfo, patch_project);
section_handler!(patch_levels, Vec<LevelItem>, patch_levels);
section_handler!(patch_buildings, Vec<BuildingInfo>, patch_buildings);
section_handler!(patch_mappings, MappingsPatch, patch_mappings);
section_handler!(patch_footprint, Value, patch_footprint);

/// POST /api/session/{id}/wizard/company-mappings
///
/// The company code-mapping document is accepted as JSON here and
/// forwarded to the converter as a file upload; the refreshed wizard
/// blob (new preview, default category) is fetched afterwards.
pub async fn upload_company_mappings(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(document): Json<Value>,
) -> ApiResult<Json<WizardResponse>> {
    let store = resolve_store(&state, &session_id).await?;
    let content = serde_json::to_vec(&document)
        .map_err(|e| ApiError::BadRequest(format!("unserializable document: {}", e)))?;

    let outcome = match state
        .wizard_api
        .upload_company_mappings(&session_id, "company_mappings.json", content)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => return Err(reject_service(&state, &session_id, e).await),
    };
    tracing::info!(
        session_id = %session_id,
        mappings = outcome.mappings_count,
        unresolved = outcome.unresolved_count,
        "Company mappings uploaded"
    );

    let wizard = match state.wizard_api.get_wizard(&session_id).await {
        Ok(wizard) => wizard,
        Err(e) => return Err(reject_service(&state, &session_id, e).await),
    };
    store.set_wizard(wizard).await;
    Ok(Json(wizard_response(&store).await))
}

#[derive(Debug, Deserialize)]
pub struct AddressSearchQuery {
    pub q: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Serialize)]
pub struct AddressSearchResponse {
    pub matches: Vec<AddressCandidate>,
}

/// GET /api/session/{id}/wizard/address-search
pub async fn address_search(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<AddressSearchQuery>,
) -> ApiResult<Json<AddressSearchResponse>> {
    resolve_store(&state, &session_id).await?;
    let matches = match state
        .wizard_api
        .search_address(&query.q, &query.language)
        .await
    {
        Ok(matches) => matches,
        Err(e) => return Err(reject_service(&state, &session_id, e).await),
    };
    Ok(Json(AddressSearchResponse { matches }))
}

// ----------------------------------------------------------------------
// Navigation
// ----------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    /// Step the wizard is on after the attempt
    pub step: u8,
    pub step_name: String,
    /// Whether the requested move happened as asked
    pub moved: bool,
    /// Whether a jump was redirected to an earlier incomplete step
    pub redirected: bool,
    /// Failure reason when refused or redirected
    pub reason: Option<String>,
}

impl NavigationResponse {
    fn from_navigation(nav: Navigation) -> Self {
        match nav {
            Navigation::Moved { to, .. } => Self {
                step: to.index(),
                step_name: to.title().to_string(),
                moved: true,
                redirected: false,
                reason: None,
            },
            Navigation::Refused { at, reason } => Self {
                step: at.index(),
                step_name: at.title().to_string(),
                moved: false,
                redirected: false,
                reason: Some(reason),
            },
            Navigation::Redirected { to, reason, .. } => Self {
                step: to.index(),
                step_name: to.title().to_string(),
                moved: false,
                redirected: true,
                reason: Some(reason),
            },
        }
    }
}

/// POST /api/session/{id}/wizard/next
pub async fn next_step(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<NavigationResponse>> {
    let store = resolve_store(&state, &session_id).await?;
    match state.wizard.next(&store).await {
        Ok(nav) => Ok(Json(NavigationResponse::from_navigation(nav))),
        Err(e) => Err(reject(&state, &session_id, e).await),
    }
}

/// POST /api/session/{id}/wizard/back
pub async fn back_step(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<NavigationResponse>> {
    let store = resolve_store(&state, &session_id).await?;
    match state.wizard.back(&store).await {
        Ok(nav) => Ok(Json(NavigationResponse::from_navigation(nav))),
        Err(e) => Err(reject(&state, &session_id, e).await),
    }
}

#[derive(Debug, Deserialize)]
pub struct JumpRequest {
    /// Target step, 1-based
    pub step: u8,
}

/// POST /api/session/{id}/wizard/jump
pub async fn jump_step(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<JumpRequest>,
) -> ApiResult<Json<NavigationResponse>> {
    let store = resolve_store(&state, &session_id).await?;
    let target = WizardStep::from_index(request.step)
        .ok_or_else(|| ApiError::BadRequest(format!("no wizard step {}", request.step)))?;
    match state.wizard.jump(&store, target).await {
        Ok(nav) => Ok(Json(NavigationResponse::from_navigation(nav))),
        Err(e) => Err(reject(&state, &session_id, e).await),
    }
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub status: String,
    pub generated_feature_count: usize,
    pub message: String,
}

/// POST /api/session/{id}/wizard/confirm
///
/// Confirm the summary: generate the draft and load the review cache.
pub async fn confirm_summary(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<ConfirmResponse>> {
    let store = resolve_store(&state, &session_id).await?;
    match state.wizard.confirm_summary(&store).await {
        Ok(outcome) => Ok(Json(ConfirmResponse {
            status: outcome.status,
            generated_feature_count: outcome.generated_feature_count,
            message: outcome.message,
        })),
        Err(e) => Err(reject(&state, &session_id, e).await),
    }
}

pub fn wizard_routes() -> Router<AppState> {
    Router::new()
        .route("/api/session/:session_id/wizard", get(get_wizard))
        .route("/api/session/:session_id/wizard/project", patch(patch_project))
        .route("/api/session/:session_id/wizard/levels", patch(patch_levels))
        .route("/api/session/:session_id/wizard/buildings", patch(patch_buildings))
        .route("/api/session/:session_id/wizard/mappings", patch(patch_mappings))
        .route("/api/session/:session_id/wizard/footprint", patch(patch_footprint))
        .route(
            "/api/session/:session_id/wizard/company-mappings",
            post(upload_company_mappings),
        )
        .route(
            "/api/session/:session_id/wizard/address-search",
            get(address_search),
        )
        .route("/api/session/:session_id/wizard/next", post(next_step))
        .route("/api/session/:session_id/wizard/back", post(back_step))
        .route("/api/session/:session_id/wizard/jump", post(jump_step))
        .route("/api/session/:session_id/wizard/confirm", post(confirm_summary))
}
