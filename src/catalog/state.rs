//! Catalog state and editing operations

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use super::defaults::{CatalogDefaults, DEFAULT_SKILL_URL};
use super::records::{ClassRecord, SkillRecord};

/// Inclusion, visibility and display flags layered over the records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFlags {
    pub excluded_tags: BTreeSet<String>,
    pub excluded_ascendancies: BTreeSet<String>,
    pub hidden_skills: BTreeSet<String>,
    /// Display only
    pub collapsed_tags: BTreeSet<String>,
    /// Display only
    pub collapsed_classes: BTreeSet<String>,
}

/// How many of a class's ascendancies are excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassExclusion {
    None,
    Some,
    All,
}

/// Current skills and classes plus the user's flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    skills: Vec<SkillRecord>,
    classes: Vec<ClassRecord>,
    flags: CatalogFlags,
}

impl Catalog {
    /// Fresh catalog holding the shipped lists and no flags
    pub fn new(defaults: &CatalogDefaults) -> Self {
        Self {
            skills: defaults.skills.clone(),
            classes: defaults.classes.clone(),
            flags: CatalogFlags::default(),
        }
    }

    /// Rebuild a catalog from stored slices, keeping their order
    pub fn from_parts(skills: Vec<SkillRecord>, classes: Vec<ClassRecord>, flags: CatalogFlags) -> Self {
        Self { skills, classes, flags }
    }

    pub fn skills(&self) -> &[SkillRecord] {
        &self.skills
    }

    pub fn classes(&self) -> &[ClassRecord] {
        &self.classes
    }

    pub fn flags(&self) -> &CatalogFlags {
        &self.flags
    }

    pub fn find_skill(&self, name: &str) -> Option<&SkillRecord> {
        self.skills.iter().find(|s| s.name == name)
    }

    pub fn is_tag_excluded(&self, tag: &str) -> bool {
        self.flags.excluded_tags.contains(tag)
    }

    pub fn is_ascendancy_excluded(&self, ascendancy: &str) -> bool {
        self.flags.excluded_ascendancies.contains(ascendancy)
    }

    pub fn is_skill_hidden(&self, name: &str) -> bool {
        self.flags.hidden_skills.contains(name)
    }

    pub fn is_tag_collapsed(&self, tag: &str) -> bool {
        self.flags.collapsed_tags.contains(tag)
    }

    pub fn is_class_collapsed(&self, class: &str) -> bool {
        self.flags.collapsed_classes.contains(class)
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Append a skill after trimming its name and tag.
    ///
    /// The list is not re-sorted; alphabetical order is only restored on
    /// bulk reset.
    pub fn add_skill(&mut self, skill: SkillRecord) -> Result<&SkillRecord, ValidationError> {
        let name = skill.name.trim();
        let tag = skill.tag.trim();
        if name.is_empty() {
            return Err(ValidationError::BlankField("Skill name"));
        }
        if tag.is_empty() {
            return Err(ValidationError::BlankField("Tag"));
        }
        if self.skills.iter().any(|s| s.same_name(name)) {
            return Err(ValidationError::DuplicateSkill(name.to_string()));
        }

        let url = skill.url.trim();
        let record = SkillRecord {
            name: name.to_string(),
            tag: tag.to_string(),
            url: if url.is_empty() { DEFAULT_SKILL_URL.to_string() } else { url.to_string() },
            attribute: skill.attribute,
        };
        log::info!("Added skill {} under {}", record.name, record.tag);
        self.skills.push(record);
        Ok(&self.skills[self.skills.len() - 1])
    }

    /// Remove a skill and forget its hidden flag. Unknown names are ignored.
    pub fn delete_skill(&mut self, name: &str) -> bool {
        let before = self.skills.len();
        self.skills.retain(|s| s.name != name);
        self.flags.hidden_skills.remove(name);
        self.skills.len() != before
    }

    /// Remove every skill carrying `tag`. Callers confirm first.
    pub fn delete_tag(&mut self, tag: &str) -> usize {
        let before = self.skills.len();
        self.skills.retain(|s| s.tag != tag);
        let removed = before - self.skills.len();
        log::info!("Deleted tag {} ({} skills)", tag, removed);
        removed
    }

    /// Remove a base class with all its ascendancies. Callers confirm first.
    pub fn delete_class(&mut self, class: &str) -> usize {
        let before = self.classes.len();
        self.classes.retain(|c| c.class != class);
        let removed = before - self.classes.len();
        log::info!("Deleted class {} ({} ascendancies)", class, removed);
        removed
    }

    pub fn delete_ascendancy(&mut self, ascendancy: &str) -> usize {
        let before = self.classes.len();
        self.classes.retain(|c| c.ascendancy != ascendancy);
        before - self.classes.len()
    }

    /// Restore the shipped lists and clear every flag
    pub fn reset_to_defaults(&mut self, defaults: &CatalogDefaults) {
        *self = Self::new(defaults);
        log::info!("Catalog reset to defaults");
    }

    // ------------------------------------------------------------------
    // Flags
    // ------------------------------------------------------------------

    /// Returns true when the tag is now excluded
    pub fn toggle_tag_exclusion(&mut self, tag: &str) -> bool {
        toggle(&mut self.flags.excluded_tags, tag)
    }

    /// Returns true when the ascendancy is now excluded
    pub fn toggle_ascendancy_exclusion(&mut self, ascendancy: &str) -> bool {
        toggle(&mut self.flags.excluded_ascendancies, ascendancy)
    }

    /// Returns true when the skill is now hidden
    pub fn toggle_skill_visibility(&mut self, name: &str) -> bool {
        toggle(&mut self.flags.hidden_skills, name)
    }

    pub fn toggle_tag_collapse(&mut self, tag: &str) -> bool {
        toggle(&mut self.flags.collapsed_tags, tag)
    }

    pub fn toggle_class_collapse(&mut self, class: &str) -> bool {
        toggle(&mut self.flags.collapsed_classes, class)
    }

    /// Ascendancies currently listed under a base class
    pub fn ascendancies_of(&self, class: &str) -> Vec<&str> {
        self.classes
            .iter()
            .filter(|c| c.class == class)
            .map(|c| c.ascendancy.as_str())
            .collect()
    }

    pub fn class_exclusion(&self, class: &str) -> ClassExclusion {
        let ascendancies = self.ascendancies_of(class);
        let excluded = ascendancies
            .iter()
            .filter(|a| self.is_ascendancy_excluded(a))
            .count();
        if excluded == 0 {
            ClassExclusion::None
        } else if excluded == ascendancies.len() {
            ClassExclusion::All
        } else {
            ClassExclusion::Some
        }
    }

    /// Exclude every ascendancy of `class`, or include them all when every
    /// one was already excluded. A partially excluded class becomes fully
    /// excluded.
    pub fn toggle_class_exclusion(&mut self, class: &str) -> ClassExclusion {
        let ascendancies: Vec<String> = self
            .ascendancies_of(class)
            .into_iter()
            .map(str::to_string)
            .collect();
        let all_excluded = ascendancies.iter().all(|a| self.is_ascendancy_excluded(a));

        if all_excluded {
            for a in &ascendancies {
                self.flags.excluded_ascendancies.remove(a);
            }
        } else {
            self.flags.excluded_ascendancies.extend(ascendancies);
        }
        self.class_exclusion(class)
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    /// Distinct tags present among the skills, sorted
    pub fn ordered_tags(&self) -> Vec<String> {
        self.skills
            .iter()
            .map(|s| s.tag.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Distinct tags that are not excluded, sorted
    pub fn available_tags(&self) -> Vec<String> {
        self.ordered_tags()
            .into_iter()
            .filter(|t| !self.is_tag_excluded(t))
            .collect()
    }

    /// Skills grouped into their tag columns
    pub fn skills_by_tag(&self) -> BTreeMap<&str, Vec<&SkillRecord>> {
        self.search_skills("")
    }

    /// Skills whose name contains `query` (case-insensitive), by tag
    pub fn search_skills(&self, query: &str) -> BTreeMap<&str, Vec<&SkillRecord>> {
        let query = query.to_lowercase();
        let mut groups: BTreeMap<&str, Vec<&SkillRecord>> = BTreeMap::new();
        for skill in &self.skills {
            if skill.name.to_lowercase().contains(&query) {
                groups.entry(skill.tag.as_str()).or_default().push(skill);
            }
        }
        groups
    }

    /// Ascendancies grouped by base class, classes in first-seen order
    pub fn classes_grouped(&self) -> Vec<(&str, Vec<&str>)> {
        self.search_classes("")
    }

    /// Ascendancies whose class or own name contains `query`, by class
    pub fn search_classes(&self, query: &str) -> Vec<(&str, Vec<&str>)> {
        let query = query.to_lowercase();
        let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
        for record in &self.classes {
            let matches = record.class.to_lowercase().contains(&query)
                || record.ascendancy.to_lowercase().contains(&query);
            if !matches {
                continue;
            }
            match groups.iter_mut().find(|(class, _)| *class == record.class) {
                Some((_, ascendancies)) => ascendancies.push(&record.ascendancy),
                None => groups.push((record.class.as_str(), vec![record.ascendancy.as_str()])),
            }
        }
        groups
    }
}

/// Add if absent, remove if present. Returns membership after the call.
fn toggle(set: &mut BTreeSet<String>, value: &str) -> bool {
    if set.remove(value) {
        false
    } else {
        set.insert(value.to_string());
        true
    }
}
