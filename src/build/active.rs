//! Active build record

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{ClassRecord, SkillRecord};
use crate::draft::SkillPick;
use crate::error::ValidationError;
use crate::ids::unique_id;
use crate::reorder::reorder;

/// Name given to links added without one
pub const DEFAULT_LINK_NAME: &str = "Path of Building";

/// A named external link attached to a build (usually a PoB export)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PobLink {
    pub id: String,
    pub name: String,
    pub url: String,
}

/// The committed build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveBuild {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_class: Option<ClassRecord>,
    /// The skill currently played; always one of the unlocked skills
    pub main_skill: SkillRecord,
    pub support_skills: Vec<SkillRecord>,
    /// Every skill gained so far, the starting skill first
    #[serde(default)]
    pub unlocked_skills: Vec<SkillRecord>,
    #[serde(default)]
    pub pob_links: Vec<PobLink>,
    /// Creation time, milliseconds since the Unix epoch
    pub timestamp: u64,
}

impl ActiveBuild {
    pub fn new(class: ClassRecord, pick: SkillPick, timestamp: u64) -> Self {
        Self {
            name: None,
            selected_class: Some(class),
            unlocked_skills: vec![pick.main.clone()],
            main_skill: pick.main,
            support_skills: pick.supports,
            pob_links: Vec::new(),
            timestamp,
        }
    }

    /// Unlocked skills; builds stored before unlocking existed count only
    /// their main skill
    pub fn unlocked(&self) -> &[SkillRecord] {
        if self.unlocked_skills.is_empty() {
            std::slice::from_ref(&self.main_skill)
        } else {
            &self.unlocked_skills
        }
    }

    pub fn has_unlocked(&self, name: &str) -> bool {
        self.unlocked().iter().any(|s| s.name == name)
    }

    pub fn is_active_skill(&self, name: &str) -> bool {
        self.main_skill.name == name
    }

    /// Append a newly unlocked skill. The main skill is unchanged.
    pub fn unlock(&mut self, skill: SkillRecord) -> Result<(), ValidationError> {
        if self.has_unlocked(&skill.name) {
            return Err(ValidationError::AlreadyUnlocked(skill.name));
        }
        if self.unlocked_skills.is_empty() {
            self.unlocked_skills.push(self.main_skill.clone());
        }
        self.unlocked_skills.push(skill);
        Ok(())
    }

    /// Point the main skill at another skill. The unlocked list is untouched.
    pub fn set_active_skill(&mut self, skill: SkillRecord) {
        self.main_skill = skill;
    }

    /// Blank names clear the custom name
    pub fn rename(&mut self, name: &str) {
        self.name = if name.is_empty() { None } else { Some(name.to_string()) };
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed Build")
    }

    /// Append a link. The url is required; a blank name becomes
    /// [`DEFAULT_LINK_NAME`].
    pub fn add_pob_link(
        &mut self,
        name: &str,
        url: &str,
        rng: &mut impl Rng,
    ) -> Result<&PobLink, ValidationError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ValidationError::BlankField("Link url"));
        }
        let name = match name.trim() {
            "" => DEFAULT_LINK_NAME,
            n => n,
        };
        let id = unique_id(rng, self.pob_links.iter().map(|l| l.id.as_str()));
        self.pob_links.push(PobLink {
            id,
            name: name.to_string(),
            url: url.to_string(),
        });
        Ok(&self.pob_links[self.pob_links.len() - 1])
    }

    pub fn remove_pob_link(&mut self, id: &str) -> bool {
        let before = self.pob_links.len();
        self.pob_links.retain(|l| l.id != id);
        self.pob_links.len() != before
    }

    pub fn reorder_pob_links(&mut self, from: usize, to: usize) -> bool {
        reorder(&mut self.pob_links, from, to)
    }
}
