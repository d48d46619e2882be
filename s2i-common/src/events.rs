//! Event types for the converter front end
//!
//! Every session-store slice mutation emits exactly one `StudioEvent` on
//! the `EventBus` before the mutating call returns, so dependent views
//! always observe a mutation before the next user action is processed.
//! Events are serialized for SSE transmission to connected browsers.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Session workflow events
///
/// Broadcast via [`EventBus`] and forwarded verbatim over SSE.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StudioEvent {
    /// A converter session was opened and its store initialized
    SessionOpened {
        session_id: String,
        file_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Session store was torn down (logout, expiry, or server eviction)
    SessionCleared {
        session_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Imported file list replaced (classification edit, detect-all)
    FilesUpdated {
        session_id: String,
        file_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The file service proposed a classification rule to learn
    LearningSuggested {
        session_id: String,
        keyword: String,
        feature_type: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Wizard state slice replaced
    WizardUpdated {
        session_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Wizard navigation moved to a different step
    StepChanged {
        session_id: String,
        /// Step index before navigation (1-based)
        from: u8,
        /// Step index after navigation (1-based)
        to: u8,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Draft feature set generated from the confirmed wizard summary
    DraftGenerated {
        session_id: String,
        generated_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Feature cache replaced from the feature service
    FeaturesReloaded {
        session_id: String,
        feature_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// One cached feature replaced by the server's echoed record
    FeatureUpdated {
        session_id: String,
        feature_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Selection slice replaced
    SelectionChanged {
        session_id: String,
        selected: Vec<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Filter slice replaced
    FiltersChanged {
        session_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Validation report replaced
    ValidationCompleted {
        session_id: String,
        error_count: usize,
        warning_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Validation report discarded after a feature mutation
    ValidationInvalidated {
        session_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Autofix pass finished (revalidation already installed)
    AutofixApplied {
        session_id: String,
        total_fixed: usize,
        pending_confirmation: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Export archive fetched successfully
    ExportCompleted {
        session_id: String,
        filename: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Undo history depth changed
    HistoryChanged {
        session_id: String,
        depth: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl StudioEvent {
    /// Session id the event belongs to
    pub fn session_id(&self) -> &str {
        match self {
            StudioEvent::SessionOpened { session_id, .. }
            | StudioEvent::SessionCleared { session_id, .. }
            | StudioEvent::FilesUpdated { session_id, .. }
            | StudioEvent::LearningSuggested { session_id, .. }
            | StudioEvent::WizardUpdated { session_id, .. }
            | StudioEvent::StepChanged { session_id, .. }
            | StudioEvent::DraftGenerated { session_id, .. }
            | StudioEvent::FeaturesReloaded { session_id, .. }
            | StudioEvent::FeatureUpdated { session_id, .. }
            | StudioEvent::SelectionChanged { session_id, .. }
            | StudioEvent::FiltersChanged { session_id, .. }
            | StudioEvent::ValidationCompleted { session_id, .. }
            | StudioEvent::ValidationInvalidated { session_id, .. }
            | StudioEvent::AutofixApplied { session_id, .. }
            | StudioEvent::ExportCompleted { session_id, .. }
            | StudioEvent::HistoryChanged { session_id, .. } => session_id,
        }
    }
}

/// Broadcast bus for [`StudioEvent`]s
///
/// Cheap to clone; all clones share the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StudioEvent>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// Old events are dropped for lagging subscribers once the buffer
    /// fills; SSE consumers treat a lag as a signal to re-fetch state.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// A send with no subscribers is not an error; the event is simply
    /// dropped (nobody is watching yet).
    pub fn emit(&self, event: StudioEvent) {
        match self.tx.send(event) {
            Ok(count) => {
                tracing::trace!(subscribers = count, "Event emitted");
            }
            Err(_) => {
                tracing::trace!("Event emitted with no subscribers");
            }
        }
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(StudioEvent::SessionOpened {
            session_id: "abc".into(),
            file_count: 3,
            timestamp: chrono::Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.session_id(), "abc");
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = StudioEvent::StepChanged {
            session_id: "abc".into(),
            from: 2,
            to: 3,
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "StepChanged");
        assert_eq!(json["from"], 2);
    }
}
