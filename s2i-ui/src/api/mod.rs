//! HTTP API handlers
//!
//! Thin handlers over the workflow engines. All engine failures are
//! converted at this boundary; a session-invalid failure additionally
//! tears down the local store so the browser is forced back to the
//! import entry point with nothing stale left behind.

pub mod export;
pub mod files;
pub mod health;
pub mod review;
pub mod session;
pub mod sse;
pub mod wizard;

pub use export::export_routes;
pub use files::files_routes;
pub use health::health_routes;
pub use review::review_routes;
pub use session::session_routes;
pub use wizard::wizard_routes;

use crate::error::{ApiError, WorkflowError};
use crate::services::ServiceError;
use crate::session::store::SessionStore;
use crate::AppState;
use std::sync::Arc;

/// Look up the store for a path session id
pub(crate) async fn resolve_store(
    state: &AppState,
    session_id: &str,
) -> Result<Arc<SessionStore>, ApiError> {
    state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| ApiError::SessionExpired(format!("no open session '{}'", session_id)))
}

/// Convert an engine failure, tearing down the store on eviction
pub(crate) async fn reject(state: &AppState, session_id: &str, err: WorkflowError) -> ApiError {
    if matches!(&err, WorkflowError::Service(service) if service.is_session_invalid()) {
        tracing::warn!(
            session_id = %session_id,
            "Converter session evicted; clearing local store"
        );
        state.sessions.close(session_id).await;
    } else {
        tracing::error!(session_id = %session_id, error = %err, "Workflow action failed");
    }
    err.into()
}

/// Service-layer variant of [`reject`]
pub(crate) async fn reject_service(
    state: &AppState,
    session_id: &str,
    err: ServiceError,
) -> ApiError {
    reject(state, session_id, WorkflowError::Service(err)).await
}
