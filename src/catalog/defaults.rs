//! Shipped catalog data
//!
//! Loads the default skill and class lists from RON files, with fallback to
//! the copies compiled into the binary.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use super::records::{sort_by_name, ClassRecord, SkillRecord};

/// Placeholder url for skills added without one
pub const DEFAULT_SKILL_URL: &str = "#";

const EMBEDDED_SKILLS: &str = include_str!("../../assets/data/skills.ron");
const EMBEDDED_CLASSES: &str = include_str!("../../assets/data/classes.ron");

/// The shipped skill and class lists a catalog resets to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogDefaults {
    /// Sorted alphabetically by name
    pub skills: Vec<SkillRecord>,
    pub classes: Vec<ClassRecord>,
}

impl CatalogDefaults {
    /// Load from `assets/data/` when present, otherwise use the embedded data
    pub fn new() -> Self {
        Self::load_from(Path::new("assets/data"))
    }

    /// Load from a data directory, falling back per file
    pub fn load_from(base_path: &Path) -> Self {
        let mut skills = load_ron_file(&base_path.join("skills.ron"))
            .unwrap_or_else(|| parse_embedded(EMBEDDED_SKILLS, "skills.ron"));
        sort_by_name(&mut skills);

        let classes = load_ron_file(&base_path.join("classes.ron"))
            .unwrap_or_else(|| parse_embedded(EMBEDDED_CLASSES, "classes.ron"));

        Self { skills, classes }
    }

    /// Build defaults from explicit lists
    pub fn from_lists(mut skills: Vec<SkillRecord>, classes: Vec<ClassRecord>) -> Self {
        sort_by_name(&mut skills);
        Self { skills, classes }
    }

    /// Distinct tags of the shipped skills, sorted
    pub fn tags(&self) -> BTreeSet<String> {
        self.skills.iter().map(|s| s.tag.clone()).collect()
    }
}

impl Default for CatalogDefaults {
    fn default() -> Self {
        Self::from_lists(
            parse_embedded(EMBEDDED_SKILLS, "skills.ron"),
            parse_embedded(EMBEDDED_CLASSES, "classes.ron"),
        )
    }
}

fn load_ron_file<T: DeserializeOwned>(path: &Path) -> Option<T> {
    if !path.exists() {
        return None;
    }
    match fs::read_to_string(path) {
        Ok(content) => match ron::from_str(&content) {
            Ok(data) => {
                log::debug!("Loaded catalog data from {:?}", path);
                Some(data)
            }
            Err(e) => {
                log::warn!("Failed to parse {:?}: {}", path, e);
                None
            }
        },
        Err(e) => {
            log::warn!("Failed to read {:?}: {}", path, e);
            None
        }
    }
}

fn parse_embedded<T: DeserializeOwned>(content: &str, name: &str) -> Vec<T> {
    ron::from_str(content).unwrap_or_else(|e| {
        log::error!("Embedded {} is invalid: {}", name, e);
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_data_parses() {
        let defaults = CatalogDefaults::default();
        assert!(!defaults.skills.is_empty(), "No shipped skills");
        assert_eq!(defaults.classes.len(), 19);
        assert!(defaults.classes.contains(&ClassRecord::new("Scion", "Ascendant")));
    }

    #[test]
    fn test_shipped_skills_are_sorted_and_unique() {
        let defaults = CatalogDefaults::default();
        let mut sorted = defaults.skills.clone();
        sort_by_name(&mut sorted);
        assert_eq!(sorted, defaults.skills);

        let names: BTreeSet<_> = defaults.skills.iter().map(|s| s.name.to_lowercase()).collect();
        assert_eq!(names.len(), defaults.skills.len());
    }

    #[test]
    fn test_missing_directory_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = CatalogDefaults::load_from(&dir.path().join("nope"));
        assert_eq!(loaded, CatalogDefaults::default());
    }

    #[test]
    fn test_override_file_is_used() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("classes.ron"),
            r#"[(class: "Witch", ascendancy: "Elementalist")]"#,
        )
        .unwrap();
        fs::write(dir.path().join("skills.ron"), "not ron at all").unwrap();

        let loaded = CatalogDefaults::load_from(dir.path());
        assert_eq!(loaded.classes, vec![ClassRecord::new("Witch", "Elementalist")]);
        // Corrupt skills file falls back to the embedded list
        assert_eq!(loaded.skills, CatalogDefaults::default().skills);
    }
}
