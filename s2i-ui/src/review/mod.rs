//! Review/edit state machine: filtering, selection, mutations, undo

pub mod engine;
pub mod filter;
pub mod selection;

pub use engine::{status_filter_after_validation, ReviewEngine, UndoOutcome};
pub use filter::Filters;
pub use selection::Selection;
