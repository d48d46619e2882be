//! Review filtering
//!
//! Filtering is a pure projection over the feature cache: populated
//! fields AND together, absent fields impose no constraint, and the
//! cache itself is never touched.

use crate::models::FeatureRecord;
use serde::{Deserialize, Serialize};

/// Active review filters; every field optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_type: Option<String>,
    /// Matches `properties.level_id`, or the level feature itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Computed review status ("error", "warning", "mapped")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Case-insensitive substring search; empty matches everything
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Filters {
    /// Whether no constraint is populated
    pub fn is_empty(&self) -> bool {
        self.feature_type.is_none()
            && self.level.is_none()
            && self.category.is_none()
            && self.status.is_none()
            && self.search.as_deref().map(str::is_empty).unwrap_or(true)
    }

    /// Whether one record passes every populated filter
    pub fn matches(&self, record: &FeatureRecord) -> bool {
        if let Some(wanted) = &self.feature_type {
            if record.feature_type != *wanted {
                return false;
            }
        }
        if let Some(level) = &self.level {
            let on_level = record.level_id() == Some(level.as_str())
                || (record.feature_type == "level" && record.id == *level);
            if !on_level {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if record.category() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if record.status() != Some(status.as_str()) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !search_matches(search, record) {
                return false;
            }
        }
        true
    }

    /// Project the visible subset, preserving cache order
    pub fn apply(&self, features: &[FeatureRecord]) -> Vec<FeatureRecord> {
        features
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

/// Substring match over id, type, display name, and serialized metadata
fn search_matches(needle: &str, record: &FeatureRecord) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    if record.id.to_lowercase().contains(&needle)
        || record.feature_type.to_lowercase().contains(&needle)
    {
        return true;
    }
    if let Some(name) = record.display_name() {
        if name.to_lowercase().contains(&needle) {
            return true;
        }
    }
    serde_json::to_string(&record.properties)
        .map(|serialized| serialized.to_lowercase().contains(&needle))
        .unwrap_or(false)
}
