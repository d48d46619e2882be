//! Step completeness predicates and navigation planning
//!
//! All functions here are pure over a snapshot of the session state and
//! are re-evaluated on every navigation attempt; nothing is cached
//! across mutations. Side effects of navigation (level sync, draft
//! generation) belong to the controller, not the gate.

use crate::models::{ImportedFile, WizardState};
use crate::wizard::steps::WizardStep;

/// Result of evaluating one step's completeness predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepCheck {
    Satisfied,
    Unsatisfied { reason: String },
}

impl StepCheck {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, StepCheck::Satisfied)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            StepCheck::Satisfied => None,
            StepCheck::Unsatisfied { reason } => Some(reason),
        }
    }
}

/// Planned outcome of a navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Navigation proceeds to `to`
    Moved { from: WizardStep, to: WizardStep },
    /// Forward navigation refused; the current step is incomplete
    Refused { at: WizardStep, reason: String },
    /// A jump was redirected to the first incomplete preceding step
    Redirected {
        from: WizardStep,
        to: WizardStep,
        reason: String,
    },
}

/// Evaluate the completeness predicate for one step
pub fn check_step(step: WizardStep, files: &[ImportedFile], wizard: &WizardState) -> StepCheck {
    match step {
        WizardStep::Import => {
            if files.is_empty() {
                unsatisfied("No files have been imported yet")
            } else {
                StepCheck::Satisfied
            }
        }
        WizardStep::Classify => {
            let unclassified: Vec<&str> = files
                .iter()
                .filter(|file| !file.is_classified())
                .map(|file| file.stem.as_str())
                .collect();
            if unclassified.is_empty() {
                StepCheck::Satisfied
            } else {
                unsatisfied(format!(
                    "{} file(s) still need a feature type: {}",
                    unclassified.len(),
                    unclassified.join(", ")
                ))
            }
        }
        WizardStep::Levels => {
            let unassigned: Vec<&str> = files
                .iter()
                .filter(|file| file.is_level_bearing() && file.detected_level.is_none())
                .map(|file| file.stem.as_str())
                .collect();
            if unassigned.is_empty() {
                StepCheck::Satisfied
            } else {
                unsatisfied(format!(
                    "{} file(s) still need a level: {}",
                    unassigned.len(),
                    unassigned.join(", ")
                ))
            }
        }
        WizardStep::Project => match &wizard.project {
            None => unsatisfied("Project info has not been filled in"),
            Some(project) => {
                if project.venue_name.trim().is_empty() {
                    unsatisfied("Venue name is required")
                } else if project.venue_category.trim().is_empty() {
                    unsatisfied("Venue category is required")
                } else if project.address.locality.trim().is_empty() {
                    unsatisfied("Address locality is required")
                } else if project.address.country.trim().is_empty() {
                    unsatisfied("Address country is required")
                } else {
                    StepCheck::Satisfied
                }
            }
        },
        WizardStep::Buildings => {
            if wizard.buildings.is_empty() {
                return unsatisfied("At least one building is required");
            }
            let uncovered: Vec<&str> = files
                .iter()
                .filter(|file| file.is_level_bearing())
                .filter(|file| {
                    !wizard
                        .buildings
                        .iter()
                        .any(|building| building.file_stems.contains(&file.stem))
                })
                .map(|file| file.stem.as_str())
                .collect();
            if uncovered.is_empty() {
                StepCheck::Satisfied
            } else {
                unsatisfied(format!(
                    "{} file(s) are not covered by any building: {}",
                    uncovered.len(),
                    uncovered.join(", ")
                ))
            }
        }
        WizardStep::UnitMapping => {
            let has_unit_files = files
                .iter()
                .any(|file| file.detected_type.as_deref() == Some("unit"));
            if has_unit_files && wizard.mappings.unit.code_column.is_none() {
                unsatisfied("A unit code column must be chosen")
            } else {
                StepCheck::Satisfied
            }
        }
        // Opening and fixture columns are all optional; defaults are
        // acceptable, so these steps never block.
        WizardStep::OpeningMapping | WizardStep::FixtureMapping => StepCheck::Satisfied,
        WizardStep::Footprint => {
            let has_detail_files = files
                .iter()
                .any(|file| file.detected_type.as_deref() == Some("detail"));
            if has_detail_files && !wizard.mappings.detail_confirmed {
                unsatisfied("Detail files must be confirmed before continuing")
            } else {
                StepCheck::Satisfied
            }
        }
        WizardStep::Summary => StepCheck::Satisfied,
    }
}

fn unsatisfied(reason: impl Into<String>) -> StepCheck {
    StepCheck::Unsatisfied {
        reason: reason.into(),
    }
}

/// First step strictly before `target` whose predicate fails, in order
pub fn first_incomplete_before(
    target: WizardStep,
    files: &[ImportedFile],
    wizard: &WizardState,
) -> Option<(WizardStep, String)> {
    for step in target.preceding() {
        if let StepCheck::Unsatisfied { reason } = check_step(step, files, wizard) {
            return Some((step, reason));
        }
    }
    None
}

/// Plan forward navigation from `current`
pub fn plan_next(current: WizardStep, files: &[ImportedFile], wizard: &WizardState) -> Navigation {
    match check_step(current, files, wizard) {
        StepCheck::Unsatisfied { reason } => Navigation::Refused { at: current, reason },
        StepCheck::Satisfied => match current.next() {
            Some(next) => Navigation::Moved { from: current, to: next },
            None => Navigation::Refused {
                at: current,
                reason: "Already at the last step".to_string(),
            },
        },
    }
}

/// Plan backward navigation from `current`; always permitted
pub fn plan_back(current: WizardStep) -> Navigation {
    match current.prev() {
        Some(prev) => Navigation::Moved { from: current, to: prev },
        None => Navigation::Moved { from: current, to: current },
    }
}

/// Plan a direct jump to `target`
///
/// Scans every step before `target` in order and redirects to the
/// first one whose predicate fails; only if all hold does the jump
/// proceed.
pub fn plan_jump(
    current: WizardStep,
    target: WizardStep,
    files: &[ImportedFile],
    wizard: &WizardState,
) -> Navigation {
    match first_incomplete_before(target, files, wizard) {
        Some((step, reason)) if step < target => Navigation::Redirected {
            from: current,
            to: step,
            reason,
        },
        _ => Navigation::Moved { from: current, to: target },
    }
}
