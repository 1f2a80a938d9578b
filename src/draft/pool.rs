//! Eligible pools
//!
//! Filtering the catalog down to what a roll may draw from.

use std::collections::{BTreeMap, BTreeSet};

use crate::build::ActiveBuild;
use crate::catalog::{Catalog, ClassRecord, SkillRecord};
use super::settings::GeneratorSettings;

/// Group label used for every entry of a base-class pool preview
pub const BASE_CLASS_GROUP: &str = "Base Class";

/// Non-excluded ascendancies, in catalog order
pub fn ascendancy_pool(catalog: &Catalog) -> Vec<&ClassRecord> {
    catalog
        .classes()
        .iter()
        .filter(|c| !catalog.is_ascendancy_excluded(&c.ascendancy))
        .collect()
}

/// Distinct base classes that still have a non-excluded ascendancy, sorted
pub fn base_class_pool(catalog: &Catalog) -> Vec<&str> {
    ascendancy_pool(catalog)
        .into_iter()
        .map(|c| c.class.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Class records a roll may draw from under the current mode.
///
/// Base-class mode yields synthetic records with `ascendancy == class`.
pub fn class_pool(catalog: &Catalog, settings: &GeneratorSettings) -> Vec<ClassRecord> {
    if settings.ascendancy_mode() {
        ascendancy_pool(catalog).into_iter().cloned().collect()
    } else {
        base_class_pool(catalog).into_iter().map(ClassRecord::base).collect()
    }
}

/// Skills with a selected, non-excluded tag that are not hidden
pub fn skill_pool<'a>(catalog: &'a Catalog, settings: &GeneratorSettings) -> Vec<&'a SkillRecord> {
    catalog
        .skills()
        .iter()
        .filter(|s| {
            !catalog.is_tag_excluded(&s.tag)
                && !catalog.is_skill_hidden(&s.name)
                && settings.is_tag_selected(&s.tag)
        })
        .collect()
}

/// The skill pool minus everything the build already has unlocked
pub fn unlock_pool<'a>(
    catalog: &'a Catalog,
    settings: &GeneratorSettings,
    build: &ActiveBuild,
) -> Vec<&'a SkillRecord> {
    let owned: BTreeSet<&str> = build
        .unlocked()
        .iter()
        .chain(std::iter::once(&build.main_skill))
        .map(|s| s.name.as_str())
        .collect();
    skill_pool(catalog, settings)
        .into_iter()
        .filter(|s| !owned.contains(s.name.as_str()))
        .collect()
}

/// Class pool names for display: ascendancies under their class, or every
/// base class under [`BASE_CLASS_GROUP`]
pub fn class_pool_preview(catalog: &Catalog, settings: &GeneratorSettings) -> Vec<(String, Vec<String>)> {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for record in class_pool(catalog, settings) {
        let (group, name) = if settings.ascendancy_mode() {
            (record.class, record.ascendancy)
        } else {
            (BASE_CLASS_GROUP.to_string(), record.class)
        };
        match groups.iter_mut().find(|(g, _)| *g == group) {
            Some((_, names)) => names.push(name),
            None => groups.push((group, vec![name])),
        }
    }
    groups
}

/// Skill pool names grouped by tag
pub fn skill_pool_preview<'a>(catalog: &'a Catalog, settings: &GeneratorSettings) -> BTreeMap<&'a str, Vec<&'a str>> {
    let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for skill in skill_pool(catalog, settings) {
        groups.entry(skill.tag.as_str()).or_default().push(skill.name.as_str());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogDefaults;

    fn test_catalog() -> Catalog {
        Catalog::new(&CatalogDefaults::from_lists(
            vec![
                SkillRecord::new("A", "Fire", "#"),
                SkillRecord::new("B", "Fire", "#"),
                SkillRecord::new("C", "Cold", "#"),
            ],
            vec![
                ClassRecord::new("Witch", "Elementalist"),
                ClassRecord::new("Witch", "Necromancer"),
                ClassRecord::new("Duelist", "Slayer"),
            ],
        ))
    }

    fn all_tags() -> GeneratorSettings {
        GeneratorSettings::new(vec!["Fire".to_string(), "Cold".to_string()])
    }

    #[test]
    fn test_skill_pool_applies_every_filter() {
        let mut catalog = test_catalog();
        let mut settings = all_tags();
        assert_eq!(skill_pool(&catalog, &settings).len(), 3);

        catalog.toggle_skill_visibility("A");
        assert_eq!(skill_pool(&catalog, &settings).len(), 2);

        catalog.toggle_tag_exclusion("Cold");
        assert_eq!(skill_pool(&catalog, &settings).len(), 1);

        settings.toggle_selected_tag("Fire");
        assert!(skill_pool(&catalog, &settings).is_empty());
    }

    #[test]
    fn test_base_class_mode_builds_synthetic_records() {
        let mut catalog = test_catalog();
        let mut settings = all_tags();
        settings.set_ascendancy_mode(false);

        let pool = class_pool(&catalog, &settings);
        assert_eq!(pool, vec![ClassRecord::base("Duelist"), ClassRecord::base("Witch")]);

        catalog.toggle_ascendancy_exclusion("Slayer");
        assert_eq!(class_pool(&catalog, &settings), vec![ClassRecord::base("Witch")]);
    }

    #[test]
    fn test_ascendancy_mode_skips_excluded() {
        let mut catalog = test_catalog();
        catalog.toggle_class_exclusion("Witch");
        let pool = class_pool(&catalog, &all_tags());
        assert_eq!(pool, vec![ClassRecord::new("Duelist", "Slayer")]);
    }

    #[test]
    fn test_pool_previews() {
        let catalog = test_catalog();
        let mut settings = all_tags();

        let classes = class_pool_preview(&catalog, &settings);
        assert_eq!(classes[0].0, "Witch");
        assert_eq!(classes[0].1, vec!["Elementalist", "Necromancer"]);

        settings.set_ascendancy_mode(false);
        let bases = class_pool_preview(&catalog, &settings);
        assert_eq!(bases, vec![(BASE_CLASS_GROUP.to_string(), vec!["Duelist".to_string(), "Witch".to_string()])]);

        let skills = skill_pool_preview(&catalog, &settings);
        assert_eq!(skills["Fire"], vec!["A", "B"]);
        assert_eq!(skills["Cold"], vec!["C"]);
    }
}
