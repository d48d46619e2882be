//! Session-scoped state: store, registry, and edit history

pub mod history;
pub mod registry;
pub mod store;

pub use history::{EditHistoryEntry, UndoStack};
pub use registry::SessionRegistry;
pub use store::{SessionState, SessionStore};
