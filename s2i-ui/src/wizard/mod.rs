//! Wizard progression: pure gate + side-effecting controller

pub mod gate;
pub mod steps;

pub use gate::{check_step, first_incomplete_before, Navigation, StepCheck};
pub use steps::{WizardStep, ALL_STEPS};

use crate::error::WorkflowError;
use crate::models::{GenerationStatus, ImportedFile, LevelItem};
use crate::review::engine::ReviewEngine;
use crate::services::{GenerateOutcome, WizardApi};
use crate::session::store::SessionStore;
use chrono::Utc;
use s2i_common::StudioEvent;
use std::sync::Arc;

/// Drives wizard navigation against one session store
///
/// The gate itself is pure; this controller owns the side effects:
/// syncing derived level metadata when the Levels step is left, and
/// triggering draft generation when the summary is confirmed.
pub struct WizardController {
    wizard_api: Arc<dyn WizardApi>,
    review: Arc<ReviewEngine>,
}

impl WizardController {
    pub fn new(wizard_api: Arc<dyn WizardApi>, review: Arc<ReviewEngine>) -> Self {
        Self { wizard_api, review }
    }

    /// Attempt forward navigation
    pub async fn next(&self, store: &SessionStore) -> Result<Navigation, WorkflowError> {
        let state = store.snapshot().await;
        let current = state.current_step.unwrap_or_else(WizardStep::first);
        let plan = gate::plan_next(current, &state.files, &state.wizard);
        self.commit(store, &plan).await?;
        Ok(plan)
    }

    /// Navigate backward; always permitted
    pub async fn back(&self, store: &SessionStore) -> Result<Navigation, WorkflowError> {
        let current = store.current_step().await;
        let plan = gate::plan_back(current);
        self.commit(store, &plan).await?;
        Ok(plan)
    }

    /// Jump directly to a step, redirecting to the first incomplete
    /// predecessor when one exists
    pub async fn jump(
        &self,
        store: &SessionStore,
        target: WizardStep,
    ) -> Result<Navigation, WorkflowError> {
        let state = store.snapshot().await;
        let current = state.current_step.unwrap_or_else(WizardStep::first);
        let plan = gate::plan_jump(current, target, &state.files, &state.wizard);
        self.commit(store, &plan).await?;
        Ok(plan)
    }

    /// Confirm the summary step: generate the draft feature set and
    /// load it into the review cache
    ///
    /// Every predicate before Summary is re-checked; the first failure
    /// refuses the confirmation without touching the converter.
    pub async fn confirm_summary(
        &self,
        store: &SessionStore,
    ) -> Result<GenerateOutcome, WorkflowError> {
        let state = store.snapshot().await;
        if let Some((step, reason)) =
            gate::first_incomplete_before(WizardStep::Summary, &state.files, &state.wizard)
        {
            return Err(WorkflowError::StepIncomplete { step, reason });
        }

        let outcome = self.review.generate_draft(store).await?;

        let mut wizard = store.wizard().await;
        wizard.generation_status = GenerationStatus::DraftReady;
        store.set_wizard(wizard).await;

        store.events().emit(StudioEvent::DraftGenerated {
            session_id: store.session_id().to_string(),
            generated_count: outcome.generated_feature_count,
            timestamp: Utc::now(),
        });
        tracing::info!(
            session_id = %store.session_id(),
            generated = outcome.generated_feature_count,
            "Draft generation completed"
        );
        Ok(outcome)
    }

    /// Apply a planned move, running the Levels-exit sync when due
    async fn commit(&self, store: &SessionStore, plan: &Navigation) -> Result<(), WorkflowError> {
        let (from, to) = match plan {
            Navigation::Moved { from, to } => (*from, *to),
            Navigation::Redirected { from, to, .. } => (*from, *to),
            Navigation::Refused { .. } => return Ok(()),
        };
        if from == to {
            return Ok(());
        }

        // Leaving the level-mapping step pushes the per-file level
        // metadata into the wizard blob (one-way sync, not a gate
        // condition).
        if from == WizardStep::Levels {
            self.sync_levels(store).await?;
        }

        store.set_current_step(to).await;
        Ok(())
    }

    /// One-way sync of derived level metadata into the wizard state
    async fn sync_levels(&self, store: &SessionStore) -> Result<(), WorkflowError> {
        let files = store.files().await;
        let items = level_items_from_files(&files);
        let wizard = self
            .wizard_api
            .patch_levels(store.session_id(), &items)
            .await?;
        store.set_wizard(wizard).await;
        tracing::debug!(
            session_id = %store.session_id(),
            levels = items.len(),
            "Level metadata synced into wizard state"
        );
        Ok(())
    }
}

/// Derive level rows from the classified file list
pub fn level_items_from_files(files: &[ImportedFile]) -> Vec<LevelItem> {
    files
        .iter()
        .filter(|file| file.is_level_bearing())
        .map(|file| LevelItem {
            stem: file.stem.clone(),
            detected_type: file.detected_type.clone(),
            ordinal: file.detected_level,
            name: file.level_name.clone(),
            short_name: file
                .short_name
                .clone()
                .or_else(|| file.detected_level.map(default_short_name)),
            outdoor: file.outdoor,
            category: Some(file.level_category.clone()),
        })
        .collect()
}

/// Default short label for a level ordinal: GF, 1F, B1, ...
fn default_short_name(ordinal: i32) -> String {
    if ordinal == 0 {
        "GF".to_string()
    } else if ordinal > 0 {
        format!("{}F", ordinal)
    } else {
        format!("B{}", ordinal.abs())
    }
}
