//! Build lifecycle
//!
//! `NoBuild -> BuildActive` on finalize, self-loops on unlocks and skill
//! swaps, back to `NoBuild` on reset.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::catalog::{ClassRecord, SkillRecord};
use crate::draft::SkillPick;
use crate::error::ValidationError;
use super::active::{ActiveBuild, PobLink};

/// Milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Owner of the single active build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildState {
    build: Option<ActiveBuild>,
}

impl BuildState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restore(build: Option<ActiveBuild>) -> Self {
        Self { build }
    }

    pub fn build(&self) -> Option<&ActiveBuild> {
        self.build.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.build.is_some()
    }

    /// Skills unlocked so far, zero without a build
    pub fn unlocked_count(&self) -> usize {
        self.build.as_ref().map_or(0, |b| b.unlocked().len())
    }

    fn active_mut(&mut self) -> Result<&mut ActiveBuild, ValidationError> {
        self.build.as_mut().ok_or(ValidationError::NoActiveBuild)
    }

    /// Commit a new build from the selected class and skill, replacing any
    /// previous one
    pub fn finalize_new_build(&mut self, class: ClassRecord, pick: SkillPick, timestamp: u64) -> &ActiveBuild {
        if let Some(old) = &self.build {
            log::info!("Replacing build {}", old.display_name());
        }
        let build = ActiveBuild::new(class, pick, timestamp);
        log::info!(
            "Build finalized: {} / {}",
            build.selected_class.as_ref().map_or("-", |c| c.ascendancy.as_str()),
            build.main_skill.name
        );
        self.build.insert(build)
    }

    /// Add an unlocked skill to the active build
    pub fn finalize_unlock(&mut self, pick: SkillPick) -> Result<&ActiveBuild, ValidationError> {
        let build = self.active_mut()?;
        let name = pick.main.name.clone();
        build.unlock(pick.main)?;
        log::info!("Unlocked skill {} ({} total)", name, build.unlocked().len());
        Ok(&*build)
    }

    pub fn set_active_skill(&mut self, skill: SkillRecord) -> Result<(), ValidationError> {
        let build = self.active_mut()?;
        if !build.has_unlocked(&skill.name) {
            log::warn!("Activating {} which is not unlocked", skill.name);
        }
        build.set_active_skill(skill);
        Ok(())
    }

    pub fn rename(&mut self, name: &str) -> Result<(), ValidationError> {
        self.active_mut()?.rename(name);
        Ok(())
    }

    pub fn add_pob_link(&mut self, name: &str, url: &str, rng: &mut impl Rng) -> Result<&PobLink, ValidationError> {
        self.active_mut()?.add_pob_link(name, url, rng)
    }

    pub fn remove_pob_link(&mut self, id: &str) -> Result<bool, ValidationError> {
        Ok(self.active_mut()?.remove_pob_link(id))
    }

    pub fn reorder_pob_links(&mut self, from: usize, to: usize) -> Result<bool, ValidationError> {
        Ok(self.active_mut()?.reorder_pob_links(from, to))
    }

    /// Drop the build
    pub fn reset(&mut self) {
        if self.build.take().is_some() {
            log::info!("Build discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick(name: &str) -> SkillPick {
        SkillPick::new(SkillRecord::new(name, "Spell", "#"))
    }

    #[test]
    fn test_finalize_new_build() {
        let mut state = BuildState::new();
        let build = state.finalize_new_build(ClassRecord::new("Witch", "Elementalist"), pick("Arc"), 10);
        assert_eq!(build.unlocked_skills.len(), 1);
        assert_eq!(build.unlocked_skills[0], build.main_skill);
        assert_eq!(build.timestamp, 10);
        assert_eq!(state.unlocked_count(), 1);
    }

    #[test]
    fn test_operations_need_a_build() {
        let mut state = BuildState::new();
        assert_eq!(state.finalize_unlock(pick("Arc")).unwrap_err(), ValidationError::NoActiveBuild);
        assert_eq!(state.rename("x"), Err(ValidationError::NoActiveBuild));
        assert_eq!(state.remove_pob_link("id"), Err(ValidationError::NoActiveBuild));
        assert_eq!(state.unlocked_count(), 0);
    }

    #[test]
    fn test_duplicate_unlock_leaves_list_unchanged() {
        let mut state = BuildState::new();
        state.finalize_new_build(ClassRecord::new("Witch", "Elementalist"), pick("Arc"), 0);
        state.finalize_unlock(pick("Spark")).unwrap();

        let before = state.build().cloned();
        let err = state.finalize_unlock(pick("Spark")).unwrap_err();
        assert_eq!(err, ValidationError::AlreadyUnlocked("Spark".to_string()));
        assert_eq!(state.build().cloned(), before);
    }

    #[test]
    fn test_set_active_skill_and_reset() {
        let mut state = BuildState::new();
        state.finalize_new_build(ClassRecord::new("Witch", "Elementalist"), pick("Arc"), 0);
        state.finalize_unlock(pick("Spark")).unwrap();
        state.set_active_skill(SkillRecord::new("Spark", "Spell", "#")).unwrap();

        let build = state.build().unwrap();
        assert_eq!(build.main_skill.name, "Spark");
        assert_eq!(build.unlocked().len(), 2);

        state.reset();
        assert!(!state.is_active());
    }
}
