//! Wizard step sequence
//!
//! The wizard is a fixed, totally ordered sequence. Indices are 1-based
//! to match what the browser shows the user.

use serde::{Deserialize, Serialize};

/// One stage of the configuration wizard, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Source files uploaded and parsed
    Import,
    /// Every file assigned an IMDF feature type
    Classify,
    /// Level ordinals assigned to level-bearing files
    Levels,
    /// Venue name, category, and address
    Project,
    /// Buildings and their file coverage
    Buildings,
    /// Unit attribute columns (code column required)
    UnitMapping,
    /// Opening attribute columns (all optional)
    OpeningMapping,
    /// Fixture attribute columns (all optional)
    FixtureMapping,
    /// Footprint generation options
    Footprint,
    /// Final review; confirming generates the draft
    Summary,
}

/// All steps in wizard order
pub const ALL_STEPS: [WizardStep; 10] = [
    WizardStep::Import,
    WizardStep::Classify,
    WizardStep::Levels,
    WizardStep::Project,
    WizardStep::Buildings,
    WizardStep::UnitMapping,
    WizardStep::OpeningMapping,
    WizardStep::FixtureMapping,
    WizardStep::Footprint,
    WizardStep::Summary,
];

impl WizardStep {
    /// 1-based position in the sequence
    pub fn index(self) -> u8 {
        ALL_STEPS
            .iter()
            .position(|step| *step == self)
            .map(|i| i as u8 + 1)
            .unwrap_or(0)
    }

    /// Step at a 1-based position
    pub fn from_index(index: u8) -> Option<WizardStep> {
        if index == 0 {
            return None;
        }
        ALL_STEPS.get(index as usize - 1).copied()
    }

    pub fn first() -> WizardStep {
        WizardStep::Import
    }

    pub fn last() -> WizardStep {
        WizardStep::Summary
    }

    /// Following step, if any
    pub fn next(self) -> Option<WizardStep> {
        WizardStep::from_index(self.index() + 1)
    }

    /// Preceding step, if any
    pub fn prev(self) -> Option<WizardStep> {
        match self.index() {
            0 | 1 => None,
            index => WizardStep::from_index(index - 1),
        }
    }

    /// Steps strictly before this one, in order
    pub fn preceding(self) -> impl Iterator<Item = WizardStep> {
        let index = self.index();
        ALL_STEPS
            .into_iter()
            .take(index.saturating_sub(1) as usize)
    }

    /// Title shown in navigation UI and failure reasons
    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Import => "Import",
            WizardStep::Classify => "Classify files",
            WizardStep::Levels => "Assign levels",
            WizardStep::Project => "Project info",
            WizardStep::Buildings => "Buildings",
            WizardStep::UnitMapping => "Unit mapping",
            WizardStep::OpeningMapping => "Opening mapping",
            WizardStep::FixtureMapping => "Fixture mapping",
            WizardStep::Footprint => "Footprint",
            WizardStep::Summary => "Summary",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_one_based_and_dense() {
        for (position, step) in ALL_STEPS.iter().enumerate() {
            assert_eq!(step.index() as usize, position + 1);
            assert_eq!(WizardStep::from_index(step.index()), Some(*step));
        }
        assert_eq!(WizardStep::from_index(0), None);
        assert_eq!(WizardStep::from_index(11), None);
    }

    #[test]
    fn next_and_prev_walk_the_sequence() {
        assert_eq!(WizardStep::Import.next(), Some(WizardStep::Classify));
        assert_eq!(WizardStep::Summary.next(), None);
        assert_eq!(WizardStep::Import.prev(), None);
        assert_eq!(WizardStep::Summary.prev(), Some(WizardStep::Footprint));
    }

    #[test]
    fn preceding_lists_strictly_earlier_steps() {
        let before: Vec<_> = WizardStep::Levels.preceding().collect();
        assert_eq!(before, vec![WizardStep::Import, WizardStep::Classify]);
        assert_eq!(WizardStep::Import.preceding().count(), 0);
    }
}
