//! Skill and class catalog
//!
//! The pool of selectable entities plus the user's edits and exclusion flags.

pub mod records;
pub mod defaults;
pub mod state;

pub use records::{SkillRecord, ClassRecord, sort_by_name};
pub use defaults::{CatalogDefaults, DEFAULT_SKILL_URL};
pub use state::{Catalog, CatalogFlags, ClassExclusion};
