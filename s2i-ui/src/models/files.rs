//! Imported file metadata and classification suggestions

use serde::{Deserialize, Serialize};

/// Classification confidence shown next to each file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// No usable signal; the user must classify manually
    Red,
    /// Weak signal (keyword hit without level evidence)
    Yellow,
    /// Confident detection or explicit user confirmation
    Green,
}

impl Default for Confidence {
    fn default() -> Self {
        Confidence::Red
    }
}

/// One imported source file as tracked by the converter session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedFile {
    /// File stem (shared by the shapefile component set)
    pub stem: String,
    /// Source geometry type reported by the parser
    pub geometry_type: String,
    pub feature_count: usize,
    #[serde(default)]
    pub attribute_columns: Vec<String>,
    /// Detected/assigned IMDF feature type (unit, opening, ...)
    #[serde(default)]
    pub detected_type: Option<String>,
    /// Detected/assigned level ordinal
    #[serde(default)]
    pub detected_level: Option<i32>,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default)]
    pub crs_detected: Option<String>,
    #[serde(default)]
    pub level_name: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub outdoor: bool,
    #[serde(default = "default_level_category")]
    pub level_category: String,
    #[serde(default)]
    pub warnings: Vec<String>,
}

fn default_level_category() -> String {
    "unspecified".to_string()
}

/// Feature types whose files carry per-level geometry and therefore
/// require a level assignment before the wizard can proceed
pub const LEVEL_FILE_TYPES: [&str; 4] = ["unit", "opening", "fixture", "detail"];

impl ImportedFile {
    /// Whether this file must be assigned to a level
    pub fn is_level_bearing(&self) -> bool {
        self.detected_type
            .as_deref()
            .map(|t| LEVEL_FILE_TYPES.contains(&t))
            .unwrap_or(false)
    }

    /// Whether this file has been classified at all
    pub fn is_classified(&self) -> bool {
        self.detected_type
            .as_deref()
            .map(|t| !t.is_empty())
            .unwrap_or(false)
    }
}

/// Geometry cleanup counters reported at import time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupSummary {
    #[serde(default)]
    pub multipolygons_exploded: usize,
    #[serde(default)]
    pub rings_closed: usize,
    #[serde(default)]
    pub features_reoriented: usize,
    #[serde(default)]
    pub empty_features_dropped: usize,
    #[serde(default)]
    pub coordinates_rounded: usize,
}

/// A classification rule inferred from a manual correction
///
/// Offered for one-click acceptance: accepting re-runs detection with
/// the keyword added to the session's learned set; dismissing leaves
/// everything as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningSuggestion {
    /// Stem whose manual correction triggered the suggestion
    pub source_stem: String,
    /// Keyword the detector proposes to learn
    pub keyword: String,
    /// Feature type the keyword would map to
    pub feature_type: String,
    /// Other stems that would be re-classified on acceptance
    pub affected_stems: Vec<String>,
    /// Human-readable prompt text
    pub message: String,
}
