//! Validation and export service client
//!
//! Validation and autofix replace the session's validation state
//! wholesale on every call; export downloads the IMDF archive. The
//! export endpoint itself re-validates server-side and refuses while
//! errors remain, mirroring the client-side gate.

use crate::models::{AutofixOutcome, ValidationReport};
use crate::services::client::HttpConverterClient;
use crate::services::error::ServiceError;
use async_trait::async_trait;
use serde::Serialize;

/// Downloaded export archive
#[derive(Debug, Clone)]
pub struct ExportArchive {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// Validation/export service contract
#[async_trait]
pub trait ExportApi: Send + Sync {
    async fn validate(&self, session_id: &str) -> Result<ValidationReport, ServiceError>;

    /// Run an autofix pass
    ///
    /// `apply_destructive == false` applies only non-destructive fixes
    /// and reports the confirmation-required remainder; `true` applies
    /// everything.
    async fn autofix(
        &self,
        session_id: &str,
        apply_destructive: bool,
    ) -> Result<AutofixOutcome, ServiceError>;

    async fn export(&self, session_id: &str) -> Result<ExportArchive, ServiceError>;
}

#[derive(Debug, Serialize)]
struct AutofixBody {
    apply_prompted: bool,
}

#[async_trait]
impl ExportApi for HttpConverterClient {
    async fn validate(&self, session_id: &str) -> Result<ValidationReport, ServiceError> {
        self.post_empty(&self.session_path(session_id, "/validate"))
            .await
    }

    async fn autofix(
        &self,
        session_id: &str,
        apply_destructive: bool,
    ) -> Result<AutofixOutcome, ServiceError> {
        self.post_json(
            &self.session_path(session_id, "/autofix"),
            &AutofixBody { apply_prompted: apply_destructive },
        )
        .await
    }

    async fn export(&self, session_id: &str) -> Result<ExportArchive, ServiceError> {
        let (bytes, filename) = self
            .get_binary(&self.session_path(session_id, "/export"))
            .await?;
        Ok(ExportArchive {
            bytes,
            filename: filename.unwrap_or_else(|| "imdf-export.zip".to_string()),
        })
    }
}
