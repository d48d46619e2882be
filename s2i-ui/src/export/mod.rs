//! Validation / export gate
//!
//! Per-session state machine:
//!
//! ```text
//! Unvalidated → Validated(errors, warnings) → {ExportBlocked | ExportReady} → Exported
//! ```
//!
//! Export can never be attempted while validation errors are
//! outstanding; the gate refuses client-side before any request is
//! made. Any successful feature mutation drops the machine back to
//! `Unvalidated` (see `SessionStore::invalidate_validation`).

use crate::error::WorkflowError;
use crate::models::{AutofixOutcome, ValidationReport};
use crate::review::engine::{status_filter_after_validation, ReviewEngine};
use crate::services::{ExportApi, ExportArchive};
use crate::session::store::SessionStore;
use chrono::Utc;
use s2i_common::StudioEvent;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Validation/export progress for one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ExportPhase {
    /// No current validation result
    #[default]
    Unvalidated,
    /// Validation ran; counts cached until the next mutation
    Validated { errors: usize, warnings: usize },
    /// Export was requested while errors remain
    ExportBlocked { errors: usize },
    /// Export confirmation step is open
    ExportReady,
    /// Archive fetched; stays terminal until the next validate
    Exported,
}

/// Confirmation payload returned when the export gate opens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportTicket {
    pub total_features: usize,
    pub warning_count: usize,
}

/// Orchestrates validate → (optional) autofix → export
pub struct ExportGate {
    export_api: Arc<dyn ExportApi>,
    review: Arc<ReviewEngine>,
}

impl ExportGate {
    pub fn new(export_api: Arc<dyn ExportApi>, review: Arc<ReviewEngine>) -> Self {
        Self { export_api, review }
    }

    /// Run validation and install the result
    ///
    /// Replaces the report, reloads features (validation annotates
    /// derived statuses), and derives the status-filter shortcut.
    /// Safe to call repeatedly; each call simply re-fetches.
    pub async fn validate(&self, store: &SessionStore) -> Result<ValidationReport, WorkflowError> {
        let report = self.export_api.validate(store.session_id()).await?;

        store.set_validation(report.clone()).await;
        self.review.reload(store).await?;

        let filters = status_filter_after_validation(&report, &store.filters().await);
        store.set_filters(filters).await;

        tracing::info!(
            session_id = %store.session_id(),
            errors = report.summary.error_count,
            warnings = report.summary.warning_count,
            "Validation completed"
        );
        Ok(report)
    }

    /// Run an autofix pass
    ///
    /// With `apply_destructive == false` only safe fixes are applied
    /// and the confirmation-required remainder is reported; the caller
    /// confirms by calling again with `true`. Every pass ends with the
    /// server's revalidation installed and features reloaded.
    pub async fn autofix(
        &self,
        store: &SessionStore,
        apply_destructive: bool,
    ) -> Result<AutofixOutcome, WorkflowError> {
        let outcome = self
            .export_api
            .autofix(store.session_id(), apply_destructive)
            .await?;

        store.set_validation(outcome.revalidation.clone()).await;
        self.review.reload(store).await?;

        store.events().emit(StudioEvent::AutofixApplied {
            session_id: store.session_id().to_string(),
            total_fixed: outcome.total_fixed,
            pending_confirmation: outcome.total_requiring_confirmation,
            timestamp: Utc::now(),
        });
        Ok(outcome)
    }

    /// Request export
    ///
    /// Refused without a current validation, and refused with the
    /// blocked condition while `error_count > 0`. Only a clean
    /// validation opens the confirmation step.
    pub async fn request_export(&self, store: &SessionStore) -> Result<ExportTicket, WorkflowError> {
        let phase = store.export_phase().await;
        match phase {
            ExportPhase::Unvalidated | ExportPhase::Exported => Err(WorkflowError::ValidationRequired),
            ExportPhase::Validated { errors, .. } | ExportPhase::ExportBlocked { errors }
                if errors > 0 =>
            {
                store.set_export_phase(ExportPhase::ExportBlocked { errors }).await;
                Err(WorkflowError::ExportBlocked { error_count: errors })
            }
            ExportPhase::Validated { .. } | ExportPhase::ExportBlocked { .. } | ExportPhase::ExportReady => {
                let report = store.validation().await.unwrap_or_default();
                store.set_export_phase(ExportPhase::ExportReady).await;
                Ok(ExportTicket {
                    total_features: report.summary.total_features,
                    warning_count: report.summary.warning_count,
                })
            }
        }
    }

    /// Confirm the open export and fetch the archive
    pub async fn confirm_export(&self, store: &SessionStore) -> Result<ExportArchive, WorkflowError> {
        if store.export_phase().await != ExportPhase::ExportReady {
            return Err(WorkflowError::ExportNotReady);
        }

        let archive = self.export_api.export(store.session_id()).await?;
        store.set_export_phase(ExportPhase::Exported).await;
        store.events().emit(StudioEvent::ExportCompleted {
            session_id: store.session_id().to_string(),
            filename: archive.filename.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!(
            session_id = %store.session_id(),
            filename = %archive.filename,
            bytes = archive.bytes.len(),
            "Export archive fetched"
        );
        Ok(archive)
    }
}
