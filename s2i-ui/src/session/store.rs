//! Session-scoped state container
//!
//! One `SessionStore` per open converter session, created when the
//! session is opened and torn down on logout or server eviction. The
//! store is an explicit, injectable container passed to the
//! navigation/review/validation modules; there is no ambient global.
//!
//! Every slice update takes the write lock once, replaces the slice
//! whole, releases the lock, and then emits exactly one event. A
//! reader never observes a partially-updated slice, and every mutation
//! is visible to dependent views before the next user action runs.
//! The lock is never held across an await point.

use crate::export::ExportPhase;
use crate::models::{FeatureRecord, ImportedFile, LearningSuggestion, ValidationReport, WizardState};
use crate::review::filter::Filters;
use crate::review::selection::Selection;
use crate::session::history::{EditHistoryEntry, UndoStack};
use crate::wizard::steps::WizardStep;
use chrono::Utc;
use s2i_common::{EventBus, StudioEvent};
use tokio::sync::RwLock;

/// All session-scoped state slices
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub files: Vec<ImportedFile>,
    pub learning_suggestion: Option<LearningSuggestion>,
    pub wizard: WizardState,
    pub current_step: Option<WizardStep>,
    pub features: Vec<FeatureRecord>,
    pub selection: Selection,
    pub filters: Filters,
    pub validation: Option<ValidationReport>,
    pub export_phase: ExportPhase,
    pub history: UndoStack,
}

/// Per-session state container with change notification
#[derive(Debug)]
pub struct SessionStore {
    session_id: String,
    state: RwLock<SessionState>,
    events: EventBus,
}

impl SessionStore {
    /// Build a store for a freshly opened session
    pub fn new(
        session_id: impl Into<String>,
        files: Vec<ImportedFile>,
        wizard: WizardState,
        events: EventBus,
    ) -> Self {
        let state = SessionState {
            files,
            wizard,
            current_step: Some(WizardStep::first()),
            ..Default::default()
        };
        Self {
            session_id: session_id.into(),
            state: RwLock::new(state),
            events,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Bus this store notifies on
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    fn emit(&self, event: StudioEvent) {
        self.events.emit(event);
    }

    // ------------------------------------------------------------------
    // Reads (cloned snapshots; the cache itself is never exposed mutably)
    // ------------------------------------------------------------------

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn files(&self) -> Vec<ImportedFile> {
        self.state.read().await.files.clone()
    }

    pub async fn learning_suggestion(&self) -> Option<LearningSuggestion> {
        self.state.read().await.learning_suggestion.clone()
    }

    pub async fn wizard(&self) -> WizardState {
        self.state.read().await.wizard.clone()
    }

    pub async fn current_step(&self) -> WizardStep {
        self.state
            .read()
            .await
            .current_step
            .unwrap_or_else(WizardStep::first)
    }

    pub async fn features(&self) -> Vec<FeatureRecord> {
        self.state.read().await.features.clone()
    }

    pub async fn feature(&self, feature_id: &str) -> Option<FeatureRecord> {
        self.state
            .read()
            .await
            .features
            .iter()
            .find(|record| record.id == feature_id)
            .cloned()
    }

    pub async fn selection(&self) -> Selection {
        self.state.read().await.selection.clone()
    }

    pub async fn filters(&self) -> Filters {
        self.state.read().await.filters.clone()
    }

    pub async fn validation(&self) -> Option<ValidationReport> {
        self.state.read().await.validation.clone()
    }

    pub async fn export_phase(&self) -> ExportPhase {
        self.state.read().await.export_phase.clone()
    }

    pub async fn history_depth(&self) -> usize {
        self.state.read().await.history.depth()
    }

    // ------------------------------------------------------------------
    // Slice mutations (atomic replace + one event each)
    // ------------------------------------------------------------------

    pub async fn set_files(&self, files: Vec<ImportedFile>) {
        let count = files.len();
        {
            let mut state = self.state.write().await;
            state.files = files;
        }
        self.emit(StudioEvent::FilesUpdated {
            session_id: self.session_id.clone(),
            file_count: count,
            timestamp: Utc::now(),
        });
    }

    pub async fn set_learning_suggestion(&self, suggestion: Option<LearningSuggestion>) {
        let event = suggestion.as_ref().map(|s| StudioEvent::LearningSuggested {
            session_id: self.session_id.clone(),
            keyword: s.keyword.clone(),
            feature_type: s.feature_type.clone(),
            timestamp: Utc::now(),
        });
        {
            let mut state = self.state.write().await;
            state.learning_suggestion = suggestion;
        }
        if let Some(event) = event {
            self.emit(event);
        }
    }

    /// Remove and return the pending suggestion (accept or dismiss)
    pub async fn take_learning_suggestion(&self) -> Option<LearningSuggestion> {
        self.state.write().await.learning_suggestion.take()
    }

    pub async fn set_wizard(&self, wizard: WizardState) {
        {
            let mut state = self.state.write().await;
            state.wizard = wizard;
        }
        self.emit(StudioEvent::WizardUpdated {
            session_id: self.session_id.clone(),
            timestamp: Utc::now(),
        });
    }

    pub async fn set_current_step(&self, step: WizardStep) {
        let from = {
            let mut state = self.state.write().await;
            let from = state.current_step;
            state.current_step = Some(step);
            from
        };
        let from = from.unwrap_or(step);
        if from != step {
            self.emit(StudioEvent::StepChanged {
                session_id: self.session_id.clone(),
                from: from.index(),
                to: step.index(),
                timestamp: Utc::now(),
            });
        }
    }

    pub async fn set_features(&self, features: Vec<FeatureRecord>) {
        let count = features.len();
        {
            let mut state = self.state.write().await;
            state.features = features;
        }
        self.emit(StudioEvent::FeaturesReloaded {
            session_id: self.session_id.clone(),
            feature_count: count,
            timestamp: Utc::now(),
        });
    }

    /// Replace one cached record with the server's echoed copy
    pub async fn replace_feature(&self, record: FeatureRecord) {
        let feature_id = record.id.clone();
        {
            let mut state = self.state.write().await;
            match state.features.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record,
                None => state.features.push(record),
            }
        }
        self.emit(StudioEvent::FeatureUpdated {
            session_id: self.session_id.clone(),
            feature_id,
            timestamp: Utc::now(),
        });
    }

    pub async fn toggle_selection(&self, feature_id: &str, multi: bool) -> Selection {
        let selection = {
            let mut state = self.state.write().await;
            state.selection.toggle(feature_id, multi);
            state.selection.clone()
        };
        self.emit(StudioEvent::SelectionChanged {
            session_id: self.session_id.clone(),
            selected: selection.ids().to_vec(),
            timestamp: Utc::now(),
        });
        selection
    }

    pub async fn clear_selection(&self) {
        {
            let mut state = self.state.write().await;
            state.selection.clear();
        }
        self.emit(StudioEvent::SelectionChanged {
            session_id: self.session_id.clone(),
            selected: Vec::new(),
            timestamp: Utc::now(),
        });
    }

    pub async fn set_filters(&self, filters: Filters) {
        {
            let mut state = self.state.write().await;
            state.filters = filters;
        }
        self.emit(StudioEvent::FiltersChanged {
            session_id: self.session_id.clone(),
            timestamp: Utc::now(),
        });
    }

    /// Clear selection and filters together (after delete/merge)
    pub async fn reset_selection_and_filters(&self) {
        {
            let mut state = self.state.write().await;
            state.selection.clear();
            state.filters = Filters::default();
        }
        self.emit(StudioEvent::SelectionChanged {
            session_id: self.session_id.clone(),
            selected: Vec::new(),
            timestamp: Utc::now(),
        });
        self.emit(StudioEvent::FiltersChanged {
            session_id: self.session_id.clone(),
            timestamp: Utc::now(),
        });
    }

    /// Install a fresh validation report and the phase derived from it
    pub async fn set_validation(&self, report: ValidationReport) {
        let (error_count, warning_count) =
            (report.summary.error_count, report.summary.warning_count);
        {
            let mut state = self.state.write().await;
            state.export_phase = ExportPhase::Validated {
                errors: error_count,
                warnings: warning_count,
            };
            state.validation = Some(report);
        }
        self.emit(StudioEvent::ValidationCompleted {
            session_id: self.session_id.clone(),
            error_count,
            warning_count,
            timestamp: Utc::now(),
        });
    }

    /// Drop the validation report after a successful feature mutation
    ///
    /// The cached summary is stale the moment any mutating call
    /// succeeds; export falls back to requiring a fresh validate().
    pub async fn invalidate_validation(&self) {
        let was_valid = {
            let mut state = self.state.write().await;
            let was_valid = state.validation.is_some()
                || state.export_phase != ExportPhase::Unvalidated;
            state.validation = None;
            state.export_phase = ExportPhase::Unvalidated;
            was_valid
        };
        if was_valid {
            self.emit(StudioEvent::ValidationInvalidated {
                session_id: self.session_id.clone(),
                timestamp: Utc::now(),
            });
        }
    }

    pub async fn set_export_phase(&self, phase: ExportPhase) {
        let mut state = self.state.write().await;
        state.export_phase = phase;
    }

    pub async fn push_history(&self, entry: EditHistoryEntry) {
        let depth = {
            let mut state = self.state.write().await;
            state.history.push(entry);
            state.history.depth()
        };
        self.emit(StudioEvent::HistoryChanged {
            session_id: self.session_id.clone(),
            depth,
            timestamp: Utc::now(),
        });
    }

    pub async fn pop_history(&self) -> Option<EditHistoryEntry> {
        let (entry, depth) = {
            let mut state = self.state.write().await;
            let entry = state.history.pop();
            (entry, state.history.depth())
        };
        if entry.is_some() {
            self.emit(StudioEvent::HistoryChanged {
                session_id: self.session_id.clone(),
                depth,
                timestamp: Utc::now(),
            });
        }
        entry
    }

    /// Reset every slice to its initial value
    ///
    /// Called on logout and on server-side eviction; stale data must
    /// never leak into a later session.
    pub async fn clear(&self) {
        {
            let mut state = self.state.write().await;
            *state = SessionState::default();
        }
        self.emit(StudioEvent::SessionCleared {
            session_id: self.session_id.clone(),
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> SessionStore {
        SessionStore::new("session-1", Vec::new(), WizardState::default(), EventBus::new(64))
    }

    fn record(id: &str) -> FeatureRecord {
        FeatureRecord {
            id: id.into(),
            feature_type: "unit".into(),
            geometry: None,
            properties: json!({"category": "retail"}).as_object().cloned().unwrap(),
        }
    }

    #[tokio::test]
    async fn slice_updates_are_visible_and_emit_events() {
        let store = store();
        let mut rx = store.events.subscribe();

        store.set_features(vec![record("u1")]).await;
        assert_eq!(store.features().await.len(), 1);

        match rx.recv().await.unwrap() {
            StudioEvent::FeaturesReloaded { feature_count, .. } => assert_eq!(feature_count, 1),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn replace_feature_swaps_in_place() {
        let store = store();
        store.set_features(vec![record("u1"), record("u2")]).await;

        let mut updated = record("u1");
        updated.properties.insert("category".into(), json!("parking"));
        store.replace_feature(updated).await;

        let features = store.features().await;
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].properties["category"], json!("parking"));
        assert_eq!(features[1].id, "u2");
    }

    #[tokio::test]
    async fn clear_resets_every_slice() {
        let store = store();
        store.set_features(vec![record("u1")]).await;
        store.toggle_selection("u1", false).await;
        store
            .set_filters(Filters { status: Some("error".into()), ..Default::default() })
            .await;
        store
            .push_history(EditHistoryEntry {
                feature_id: "u1".into(),
                previous_properties: Default::default(),
            })
            .await;
        store.set_validation(ValidationReport::default()).await;

        store.clear().await;

        let state = store.snapshot().await;
        assert!(state.features.is_empty());
        assert!(state.selection.is_empty());
        assert!(state.filters.is_empty());
        assert!(state.validation.is_none());
        assert!(state.history.is_empty());
        assert_eq!(state.export_phase, ExportPhase::Unvalidated);
    }

    #[tokio::test]
    async fn invalidation_only_fires_when_something_was_cached() {
        let store = store();
        let mut rx = store.events.subscribe();

        store.invalidate_validation().await;
        store.set_validation(ValidationReport::default()).await;
        store.invalidate_validation().await;

        // First invalidate was a no-op; only two events arrive.
        assert!(matches!(rx.recv().await.unwrap(), StudioEvent::ValidationCompleted { .. }));
        assert!(matches!(rx.recv().await.unwrap(), StudioEvent::ValidationInvalidated { .. }));
        assert!(rx.try_recv().is_err());
    }
}
