//! Error types for s2i-ui
//!
//! `WorkflowError` is what the engines return: either a converter
//! failure (already classified by the service layer) or a local
//! precondition failure that never reaches the server. `ApiError`
//! is the HTTP rendering of both.

use crate::services::ServiceError;
use crate::wizard::steps::WizardStep;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Engine-level failure
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Converter call failed
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The target feature is not in the working set
    #[error("Feature not found in working set: {0}")]
    FeatureNotFound(String),

    /// Export requested before validation ran
    #[error("Validation must run before export")]
    ValidationRequired,

    /// Export blocked until errors are resolved
    #[error("Export blocked: {error_count} validation error(s) outstanding")]
    ExportBlocked { error_count: usize },

    /// Export confirmed without an open confirmation step
    #[error("Export confirmation is not open")]
    ExportNotReady,

    /// Wizard confirmation attempted with an incomplete step
    #[error("Step {step:?} incomplete: {reason}")]
    StepIncomplete { step: WizardStep, reason: String },
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The converter session no longer exists (404, SESSION_NOT_FOUND)
    ///
    /// The UI treats this code as "go back to the import entry point".
    #[error("Session no longer exists: {0}")]
    SessionExpired(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Local precondition failed (409) - e.g. export while blocked
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Converter rejected our credentials (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Converter backend failed (502)
    #[error("Converter unavailable: {0}")]
    Upstream(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::SessionInvalid { detail } => ApiError::SessionExpired(detail),
            ServiceError::BadRequest { code, detail } => {
                ApiError::BadRequest(format!("{}: {}", code, detail))
            }
            ServiceError::Unauthorized { detail } => ApiError::Forbidden(detail),
            ServiceError::Server { detail } => ApiError::Upstream(detail),
            ServiceError::Transport(err) => ApiError::Upstream(err.to_string()),
            ServiceError::Payload(detail) => ApiError::Upstream(detail),
            ServiceError::Unexpected { status, detail } => {
                ApiError::Upstream(format!("HTTP {}: {}", status, detail))
            }
        }
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Service(service) => service.into(),
            WorkflowError::FeatureNotFound(id) => ApiError::NotFound(format!("feature {}", id)),
            WorkflowError::ValidationRequired => {
                ApiError::Conflict("Validation must run before export".to_string())
            }
            WorkflowError::ExportBlocked { error_count } => ApiError::Conflict(format!(
                "Export blocked until errors resolved ({} outstanding)",
                error_count
            )),
            WorkflowError::ExportNotReady => {
                ApiError::Conflict("Export confirmation is not open".to_string())
            }
            WorkflowError::StepIncomplete { step, reason } => {
                ApiError::Conflict(format!("Step '{}' incomplete: {}", step.title(), reason))
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::SessionExpired(msg) => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "CONVERTER_ERROR", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
