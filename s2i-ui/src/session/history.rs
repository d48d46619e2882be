//! Edit history for the review screen
//!
//! Pre-mutation property snapshots, LIFO, unbounded for the session
//! lifetime. Undoing replays the snapshot as a normal patch and does
//! not record a reverse entry, so an undo is not itself undoable.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Snapshot of one feature's properties taken before a patch committed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditHistoryEntry {
    pub feature_id: String,
    pub previous_properties: Map<String, Value>,
}

/// LIFO stack of edit snapshots
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    entries: Vec<EditHistoryEntry>,
}

impl UndoStack {
    pub fn push(&mut self, entry: EditHistoryEntry) {
        self.entries.push(entry);
    }

    /// Remove and return the most recent entry, if any
    pub fn pop(&mut self) -> Option<EditHistoryEntry> {
        self.entries.pop()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(feature_id: &str, category: &str) -> EditHistoryEntry {
        let mut properties = Map::new();
        properties.insert("category".into(), json!(category));
        EditHistoryEntry {
            feature_id: feature_id.into(),
            previous_properties: properties,
        }
    }

    #[test]
    fn pop_returns_most_recent_push_unchanged() {
        let mut stack = UndoStack::default();
        let first = entry("u1", "retail");
        let second = entry("u2", "restroom");
        stack.push(first.clone());
        stack.push(second.clone());

        assert_eq!(stack.pop(), Some(second));
        assert_eq!(stack.pop(), Some(first));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn round_trip_preserves_snapshot_across_unrelated_pushes() {
        let mut stack = UndoStack::default();
        let captured = entry("u1", "retail");
        stack.push(captured.clone());
        stack.push(entry("u9", "parking"));

        let _ = stack.pop();
        let popped = stack.pop().expect("entry should survive unrelated pushes");
        assert_eq!(popped.feature_id, "u1");
        assert_eq!(popped.previous_properties, captured.previous_properties);
    }

    #[test]
    fn depth_tracks_pushes_and_pops() {
        let mut stack = UndoStack::default();
        assert!(stack.is_empty());
        stack.push(entry("u1", "retail"));
        assert_eq!(stack.depth(), 1);
        stack.clear();
        assert!(stack.is_empty());
    }
}
