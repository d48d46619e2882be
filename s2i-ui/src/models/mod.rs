//! Domain models for the review workflow
//!
//! Wire shapes follow the converter backend's REST contracts; everything
//! that arrives with an unknown shape is validated at the service
//! boundary (see `feature::FeatureRecord::from_value`).

pub mod feature;
pub mod files;
pub mod validation;
pub mod wizard;

pub use feature::{FeatureRecord, Geometry};
pub use files::{CleanupSummary, Confidence, ImportedFile, LearningSuggestion};
pub use validation::{
    AutofixApplied, AutofixOutcome, AutofixPrompt, Severity, ValidationIssue, ValidationReport,
    ValidationSummary,
};
pub use wizard::{
    AddressInput, BuildingInfo, FixtureMapping, GenerationStatus, LevelItem, Mappings,
    OpeningMapping, ProjectInfo, UnitMapping, WizardState,
};
