//! Validation and autofix response shapes
//!
//! Produced only by the converter's validation service; this service
//! partitions issues per feature for display and reads the summary
//! counts for the export gate.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One validation finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Feature the issue is anchored to; None for collection-level issues
    #[serde(default)]
    pub feature_id: Option<String>,
    /// Second feature involved (overlaps, duplicate references)
    #[serde(default)]
    pub related_feature_id: Option<String>,
    /// Machine-readable check name
    pub check: String,
    pub message: String,
    pub severity: Severity,
    #[serde(default)]
    pub auto_fixable: bool,
    #[serde(default)]
    pub fix_description: Option<String>,
    /// Overlap geometry for map highlighting; opaque here
    #[serde(default)]
    pub overlap_geometry: Option<Value>,
}

/// Aggregated validation counts read by the export gate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    #[serde(default)]
    pub total_features: usize,
    #[serde(default)]
    pub error_count: usize,
    #[serde(default)]
    pub warning_count: usize,
    #[serde(default)]
    pub auto_fixable_count: usize,
}

/// Full validation result as returned by the converter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    #[serde(default)]
    pub errors: Vec<ValidationIssue>,
    #[serde(default)]
    pub warnings: Vec<ValidationIssue>,
    /// Names of checks that passed
    #[serde(default)]
    pub passed: Vec<String>,
    #[serde(default)]
    pub summary: ValidationSummary,
}

impl ValidationReport {
    /// All issues, errors first
    pub fn all_issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().chain(self.warnings.iter())
    }

    /// Partition issues by feature id for per-feature display
    ///
    /// Collection-level issues (no feature id) land in the returned
    /// general bucket.
    pub fn issues_by_feature(&self) -> (HashMap<String, Vec<&ValidationIssue>>, Vec<&ValidationIssue>) {
        let mut by_feature: HashMap<String, Vec<&ValidationIssue>> = HashMap::new();
        let mut general = Vec::new();
        for issue in self.all_issues() {
            match &issue.feature_id {
                Some(id) => by_feature.entry(id.clone()).or_default().push(issue),
                None => general.push(issue),
            }
        }
        (by_feature, general)
    }

    /// Issues anchored to one feature
    pub fn issues_for(&self, feature_id: &str) -> Vec<&ValidationIssue> {
        self.all_issues()
            .filter(|issue| issue.feature_id.as_deref() == Some(feature_id))
            .collect()
    }
}

/// One fix the converter applied during an autofix pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutofixApplied {
    #[serde(default)]
    pub feature_id: Option<String>,
    pub check: String,
    pub action: String,
    pub description: String,
}

/// One destructive fix awaiting explicit confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutofixPrompt {
    #[serde(default)]
    pub feature_id: Option<String>,
    pub check: String,
    pub description: String,
}

/// Result of one autofix round trip
///
/// Always carries the server's fresh revalidation, which replaces the
/// session's validation state wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutofixOutcome {
    #[serde(default)]
    pub fixes_applied: Vec<AutofixApplied>,
    #[serde(default)]
    pub fixes_requiring_confirmation: Vec<AutofixPrompt>,
    #[serde(default)]
    pub total_fixed: usize,
    #[serde(default)]
    pub total_requiring_confirmation: usize,
    #[serde(default)]
    pub revalidation: ValidationReport,
}
