//! Review selection
//!
//! An ordered, duplicate-free set of feature ids. Single-click replaces
//! the selection (or clears it when re-clicking the sole selected id);
//! shift/multi-click toggles membership.

use serde::{Deserialize, Serialize};

/// Current selection, in click order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    /// Toggle one id
    ///
    /// `multi == false`: re-clicking the sole selected id deselects it;
    /// any other click replaces the whole selection with `{id}`.
    /// `multi == true`: membership toggle, preserving the rest.
    pub fn toggle(&mut self, id: &str, multi: bool) {
        if multi {
            match self.ids.iter().position(|existing| existing == id) {
                Some(index) => {
                    self.ids.remove(index);
                }
                None => self.ids.push(id.to_string()),
            }
        } else if self.ids.len() == 1 && self.ids[0] == id {
            self.ids.clear();
        } else {
            self.ids = vec![id.to_string()];
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
