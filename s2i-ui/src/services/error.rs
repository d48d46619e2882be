//! Converter service error taxonomy
//!
//! Every failure from the converter backend is reduced to one of these
//! variants at the client boundary. `SessionInvalid` is the first-class
//! condition that forces the user back to the import entry point.

use serde::Deserialize;
use thiserror::Error;

/// Structured error body the converter returns: `{detail, code}`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub code: String,
}

/// Failure talking to the converter backend
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The session id is unknown or evicted server-side (HTTP 404)
    #[error("Session no longer exists: {detail}")]
    SessionInvalid { detail: String },

    /// The request was rejected (HTTP 400/422)
    #[error("Rejected by converter ({code}): {detail}")]
    BadRequest { code: String, detail: String },

    /// Authentication/authorization failure (HTTP 401/403)
    #[error("Not authorized: {detail}")]
    Unauthorized { detail: String },

    /// The converter failed internally (HTTP 5xx)
    #[error("Converter service error: {detail}")]
    Server { detail: String },

    /// The connection itself failed
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response arrived but could not be decoded
    #[error("Malformed converter response: {0}")]
    Payload(String),

    /// Fallback for anything else
    #[error("Unexpected converter response ({status}): {detail}")]
    Unexpected { status: u16, detail: String },
}

impl ServiceError {
    /// Map an HTTP status + parsed error body to a variant
    pub fn from_status(status: u16, body: Option<ErrorBody>) -> ServiceError {
        let (detail, code) = match body {
            Some(body) => (body.detail, body.code),
            None => (format!("HTTP {}", status), String::new()),
        };
        match status {
            404 => ServiceError::SessionInvalid { detail },
            400 | 422 => ServiceError::BadRequest {
                code: if code.is_empty() { "BAD_REQUEST".into() } else { code },
                detail,
            },
            401 | 403 => ServiceError::Unauthorized { detail },
            500..=599 => ServiceError::Server { detail },
            _ => ServiceError::Unexpected { status, detail },
        }
    }

    /// Whether this failure means the session is gone
    pub fn is_session_invalid(&self) -> bool {
        matches!(self, ServiceError::SessionInvalid { .. })
    }
}
