//! Progression systems
//!
//! The build-scoped checklist and the unlock-point economy derived from it.

pub mod checklist;
pub mod points;

pub use checklist::{ChecklistItem, Ledger, default_checklist, completion_percentage};
pub use points::{available_points, spent_points};
