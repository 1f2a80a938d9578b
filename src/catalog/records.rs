//! Catalog records

use serde::{Deserialize, Serialize};

/// A selectable skill. `name` is the unique key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillRecord {
    pub name: String,
    /// Grouping category, used for filtering and column display
    pub tag: String,
    /// Wiki or reference page
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl SkillRecord {
    pub fn new(name: impl Into<String>, tag: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
            url: url.into(),
            attribute: None,
        }
    }

    /// Case-insensitive name comparison, the rule used for duplicate checks
    pub fn same_name(&self, other: &str) -> bool {
        self.name.to_lowercase() == other.to_lowercase()
    }
}

/// A base class and one of its ascendancies.
///
/// In base-class mode the draft engine builds synthetic records where
/// `ascendancy == class`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassRecord {
    pub class: String,
    pub ascendancy: String,
}

impl ClassRecord {
    pub fn new(class: impl Into<String>, ascendancy: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            ascendancy: ascendancy.into(),
        }
    }

    /// Synthetic record standing for a whole base class
    pub fn base(class: impl Into<String>) -> Self {
        let class = class.into();
        Self {
            ascendancy: class.clone(),
            class,
        }
    }

    pub fn is_base(&self) -> bool {
        self.class == self.ascendancy
    }
}

/// Alphabetical display order, applied on bulk load and reset only
pub fn sort_by_name(skills: &mut [SkillRecord]) {
    skills.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
}
