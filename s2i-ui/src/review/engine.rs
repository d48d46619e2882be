//! Review engine
//!
//! Normalizes the converter's feature rows into the working set,
//! derives the visible projection, and issues single and bulk
//! mutations. All writes to the store happen only after the converter
//! call succeeds; a failed call leaves every slice exactly as it was.

use crate::error::WorkflowError;
use crate::models::feature::{normalize_rows, FeatureRecord};
use crate::models::ValidationReport;
use crate::review::filter::Filters;
use crate::review::selection::Selection;
use crate::services::{FeatureApi, ServiceError};
use crate::session::history::EditHistoryEntry;
use crate::session::store::SessionStore;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Outcome of an undo request
#[derive(Debug, Clone, PartialEq)]
pub enum UndoOutcome {
    /// The previous properties were re-applied to the feature
    Reverted { feature_id: String },
    /// Nothing to undo; the stack was empty
    NothingToUndo,
    /// The snapshot's feature no longer exists; entry discarded
    FeatureGone { feature_id: String },
}

/// Review engine over one session's working set
pub struct ReviewEngine {
    features_api: Arc<dyn FeatureApi>,
}

impl ReviewEngine {
    pub fn new(features_api: Arc<dyn FeatureApi>) -> Self {
        Self { features_api }
    }

    /// Reload the full working set from the converter
    ///
    /// Rows failing the record contract are dropped at the boundary.
    pub async fn reload(&self, store: &SessionStore) -> Result<usize, WorkflowError> {
        let rows = self.features_api.list_features(store.session_id()).await?;
        let records = normalize_rows(&rows);
        let count = records.len();
        store.set_features(records).await;
        Ok(count)
    }

    /// Generate the draft feature set, then load it into the cache
    pub async fn generate_draft(
        &self,
        store: &SessionStore,
    ) -> Result<crate::services::GenerateOutcome, WorkflowError> {
        let outcome = self.features_api.generate_draft(store.session_id()).await?;
        self.reload(store).await?;
        Ok(outcome)
    }

    /// Visible projection of the working set under the active filters
    pub async fn visible(&self, store: &SessionStore) -> (Vec<FeatureRecord>, Filters, Selection) {
        let state = store.snapshot().await;
        let visible = state.filters.apply(&state.features);
        (visible, state.filters, state.selection)
    }

    /// Patch one feature's properties
    ///
    /// The pre-mutation snapshot is captured first but recorded in the
    /// undo history only once the converter echoes the updated record,
    /// so a failed patch leaves both cache and history untouched.
    pub async fn patch_feature(
        &self,
        store: &SessionStore,
        feature_id: &str,
        properties: Map<String, Value>,
    ) -> Result<FeatureRecord, WorkflowError> {
        let previous = store
            .feature(feature_id)
            .await
            .ok_or_else(|| WorkflowError::FeatureNotFound(feature_id.to_string()))?;

        let echoed = self
            .features_api
            .patch_feature(store.session_id(), feature_id, &properties)
            .await?;
        let record = FeatureRecord::from_value(&echoed).ok_or_else(|| {
            ServiceError::Payload("patched feature failed the record contract".to_string())
        })?;

        store
            .push_history(EditHistoryEntry {
                feature_id: feature_id.to_string(),
                previous_properties: previous.properties,
            })
            .await;
        store.replace_feature(record.clone()).await;
        store.invalidate_validation().await;
        Ok(record)
    }

    /// Reverse the most recent edit
    ///
    /// Re-issues a patch with the popped snapshot; this is a normal
    /// mutation except that no new history entry is recorded, so an
    /// undo is not itself undoable. Empty stack and vanished feature
    /// are both no-ops, not errors.
    pub async fn undo(&self, store: &SessionStore) -> Result<UndoOutcome, WorkflowError> {
        let entry = match store.pop_history().await {
            Some(entry) => entry,
            None => return Ok(UndoOutcome::NothingToUndo),
        };

        if store.feature(&entry.feature_id).await.is_none() {
            tracing::debug!(feature_id = %entry.feature_id, "Undo target vanished; entry discarded");
            return Ok(UndoOutcome::FeatureGone { feature_id: entry.feature_id });
        }

        let result = self
            .features_api
            .patch_feature(store.session_id(), &entry.feature_id, &entry.previous_properties)
            .await;

        let echoed = match result {
            Ok(echoed) => echoed,
            Err(err) => {
                // Put the snapshot back; the failed undo changed nothing.
                store.push_history(entry).await;
                return Err(err.into());
            }
        };

        let record = FeatureRecord::from_value(&echoed).ok_or_else(|| {
            ServiceError::Payload("undone feature failed the record contract".to_string())
        })?;
        let feature_id = record.id.clone();
        store.replace_feature(record).await;
        store.invalidate_validation().await;
        Ok(UndoOutcome::Reverted { feature_id })
    }

    /// Apply the same properties to many features in one round trip
    ///
    /// The converter may materialize changes beyond the patched ids
    /// (derived statuses), so the engine reloads the full list instead
    /// of merging partially. Selection and filters are kept.
    pub async fn bulk_patch(
        &self,
        store: &SessionStore,
        feature_ids: &[String],
        properties: Map<String, Value>,
    ) -> Result<usize, WorkflowError> {
        let outcome = self
            .features_api
            .bulk_patch(store.session_id(), feature_ids, &properties)
            .await?;
        self.reload(store).await?;
        store.invalidate_validation().await;
        Ok(outcome.affected)
    }

    /// Delete many features in one round trip
    ///
    /// Selection and filters are always cleared afterwards; the ids
    /// they referenced may no longer exist.
    pub async fn bulk_delete(
        &self,
        store: &SessionStore,
        feature_ids: &[String],
    ) -> Result<usize, WorkflowError> {
        let outcome = self
            .features_api
            .bulk_delete(store.session_id(), feature_ids)
            .await?;
        self.reload(store).await?;
        store.reset_selection_and_filters().await;
        store.invalidate_validation().await;
        Ok(outcome.affected)
    }

    /// Collapse several units into one
    ///
    /// The merge produces a new id and removes its inputs, so this
    /// behaves like delete: full reload, then selection and filters
    /// cleared.
    pub async fn merge_units(
        &self,
        store: &SessionStore,
        feature_ids: &[String],
        display_name: Option<&str>,
    ) -> Result<FeatureRecord, WorkflowError> {
        let echoed = self
            .features_api
            .merge_units(store.session_id(), feature_ids, display_name)
            .await?;
        let merged = FeatureRecord::from_value(&echoed).ok_or_else(|| {
            ServiceError::Payload("merged feature failed the record contract".to_string())
        })?;
        self.reload(store).await?;
        store.reset_selection_and_filters().await;
        store.invalidate_validation().await;
        Ok(merged)
    }

    /// Delete one feature (single-row variant of bulk delete)
    pub async fn delete_feature(
        &self,
        store: &SessionStore,
        feature_id: &str,
    ) -> Result<(), WorkflowError> {
        self.features_api
            .delete_feature(store.session_id(), feature_id)
            .await?;
        self.reload(store).await?;
        store.reset_selection_and_filters().await;
        store.invalidate_validation().await;
        Ok(())
    }
}

/// Derive the post-validation status filter shortcut
///
/// Errors present → jump the review list to errors; else warnings →
/// warnings; else drop the status constraint.
pub fn status_filter_after_validation(report: &ValidationReport, current: &Filters) -> Filters {
    let mut filters = current.clone();
    filters.status = if report.summary.error_count > 0 {
        Some("error".to_string())
    } else if report.summary.warning_count > 0 {
        Some("warning".to_string())
    } else {
        None
    };
    filters
}
