//! Wizard configuration state
//!
//! Mirrors the converter's wizard blob. Sub-objects are treated as
//! opaque passthroughs except where the step gate's completeness
//! predicates need to look inside (project fields, building coverage,
//! unit code column, detail confirmation).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Postal address fields for venue and building addresses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressInput {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub locality: String,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub postal_code_ext: Option<String>,
    #[serde(default)]
    pub postal_code_vanity: Option<String>,
}

/// Project/venue information collected in the project step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub venue_name: String,
    pub venue_category: String,
    #[serde(default = "default_language")]
    pub language: String,
    pub address: AddressInput,
}

fn default_language() -> String {
    "en".to_string()
}

/// Per-file level assignment as edited in the levels step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelItem {
    pub stem: String,
    #[serde(default)]
    pub detected_type: Option<String>,
    #[serde(default)]
    pub ordinal: Option<i32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub outdoor: bool,
    #[serde(default)]
    pub category: Option<String>,
}

/// One building and the file stems it covers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildingInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub restriction: Option<String>,
    #[serde(default)]
    pub file_stems: Vec<String>,
    #[serde(default = "default_address_mode")]
    pub address_mode: String,
    #[serde(default)]
    pub address: Option<AddressInput>,
    #[serde(default)]
    pub address_feature_id: Option<String>,
}

fn default_address_mode() -> String {
    "venue_address".to_string()
}

/// Unit attribute column mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitMapping {
    #[serde(default)]
    pub code_column: Option<String>,
    #[serde(default)]
    pub name_column: Option<String>,
    #[serde(default)]
    pub alt_name_column: Option<String>,
    #[serde(default)]
    pub restriction_column: Option<String>,
    #[serde(default)]
    pub accessibility_column: Option<String>,
    #[serde(default)]
    pub available_categories: Vec<String>,
    /// Code→category preview rows; opaque to this service
    #[serde(default)]
    pub preview: Vec<Value>,
}

/// Opening attribute column mapping (all optional)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpeningMapping {
    #[serde(default)]
    pub category_column: Option<String>,
    #[serde(default)]
    pub name_column: Option<String>,
    #[serde(default)]
    pub accessibility_column: Option<String>,
    #[serde(default)]
    pub access_control_column: Option<String>,
    #[serde(default)]
    pub door_automatic_column: Option<String>,
    #[serde(default)]
    pub door_material_column: Option<String>,
    #[serde(default)]
    pub door_type_column: Option<String>,
}

/// Fixture attribute column mapping (all optional)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureMapping {
    #[serde(default)]
    pub category_column: Option<String>,
    #[serde(default)]
    pub name_column: Option<String>,
    #[serde(default)]
    pub alt_name_column: Option<String>,
}

/// Per-type attribute mappings plus the detail confirmation flag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mappings {
    #[serde(default)]
    pub unit: UnitMapping,
    #[serde(default)]
    pub opening: OpeningMapping,
    #[serde(default)]
    pub fixture: FixtureMapping,
    /// Detail files carry no mappable attributes; the step is confirmed
    /// explicitly instead
    #[serde(default)]
    pub detail_confirmed: bool,
}

/// Draft generation status tracked on the wizard blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    NotStarted,
    DraftReady,
}

impl Default for GenerationStatus {
    fn default() -> Self {
        GenerationStatus::NotStarted
    }
}

/// Wizard configuration blob, one per converter session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardState {
    #[serde(default)]
    pub project: Option<ProjectInfo>,
    #[serde(default)]
    pub levels: Vec<LevelItem>,
    #[serde(default)]
    pub buildings: Vec<BuildingInfo>,
    #[serde(default)]
    pub mappings: Mappings,
    /// Footprint generation options; opaque to this service
    #[serde(default)]
    pub footprint: Value,
    #[serde(default)]
    pub generation_status: GenerationStatus,
    #[serde(default)]
    pub warnings: Vec<String>,
}
