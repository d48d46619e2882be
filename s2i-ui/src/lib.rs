//! s2i-ui library interface
//!
//! The user-facing workflow service for the SHP→IMDF converter: holds
//! the session-scoped editing workflow engine (wizard step gate,
//! review engine, undo history, validation/export gate) and exposes it
//! to the browser over HTTP + SSE. The converter backend is consumed
//! as a set of black-box services.

pub mod api;
pub mod error;
pub mod export;
pub mod models;
pub mod review;
pub mod services;
pub mod session;
pub mod wizard;

pub use crate::error::{ApiError, ApiResult};

use crate::export::ExportGate;
use crate::review::engine::ReviewEngine;
use crate::services::{ExportApi, FeatureApi, FileApi, HttpConverterClient, WizardApi};
use crate::session::registry::SessionRegistry;
use crate::wizard::WizardController;
use axum::Router;
use chrono::{DateTime, Utc};
use s2i_common::EventBus;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Open session stores, one per converter session
    pub sessions: Arc<SessionRegistry>,
    /// Event bus backing SSE notification
    pub event_bus: EventBus,
    pub files_api: Arc<dyn FileApi>,
    pub wizard_api: Arc<dyn WizardApi>,
    pub features_api: Arc<dyn FeatureApi>,
    pub export_api: Arc<dyn ExportApi>,
    /// Review engine over the feature working set
    pub review: Arc<ReviewEngine>,
    /// Wizard navigation controller
    pub wizard: Arc<WizardController>,
    /// Validation/export gate
    pub export: Arc<ExportGate>,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Assemble state from the four service clients
    pub fn new(
        files_api: Arc<dyn FileApi>,
        wizard_api: Arc<dyn WizardApi>,
        features_api: Arc<dyn FeatureApi>,
        export_api: Arc<dyn ExportApi>,
        event_bus: EventBus,
    ) -> Self {
        let review = Arc::new(ReviewEngine::new(features_api.clone()));
        let wizard = Arc::new(WizardController::new(wizard_api.clone(), review.clone()));
        let export = Arc::new(ExportGate::new(export_api.clone(), review.clone()));
        Self {
            sessions: Arc::new(SessionRegistry::new()),
            event_bus,
            files_api,
            wizard_api,
            features_api,
            export_api,
            review,
            wizard,
            export,
            startup_time: Utc::now(),
        }
    }

    /// Convenience constructor against a real converter backend
    pub fn with_backend(client: HttpConverterClient, event_bus: EventBus) -> Self {
        let client = Arc::new(client);
        Self::new(
            client.clone(),
            client.clone(),
            client.clone(),
            client,
            event_bus,
        )
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::health_routes())
        .merge(api::session_routes())
        .merge(api::files_routes())
        .merge(api::wizard_routes())
        .merge(api::review_routes())
        .merge(api::export_routes())
        .route("/api/events", get(api::sse::event_stream))
        .with_state(state)
}
