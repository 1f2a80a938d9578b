//! Buildroller - random character build drafting
//!
//! Roll a class and a main skill from a curated catalog, track a progression
//! checklist, and spend completed tasks on unlocking additional skills.
//! Builds can be shared as self-contained links.

pub mod error;
pub mod ids;
pub mod reorder;
pub mod catalog;
pub mod draft;
pub mod build;
pub mod progression;
pub mod share;
pub mod save;
pub mod app;

// Re-export commonly used types
pub use app::{AppState, GeneratorSettings, Phase};
pub use build::{ActiveBuild, PobLink};
pub use catalog::{Catalog, CatalogDefaults, ClassRecord, SkillRecord};
pub use error::{DecodeError, EncodeError, PersistenceError, ValidationError};
pub use progression::{ChecklistItem, Ledger};
pub use share::{SharePreview, ShareSnapshot};
