//! Randomized candidate generation

use rand::seq::SliceRandom;
use rand::Rng;

use crate::build::ActiveBuild;
use crate::catalog::Catalog;
use crate::error::ValidationError;
use super::candidates::{ClassCandidate, SkillCandidate};
use super::pool::{class_pool, skill_pool, unlock_pool};
use super::settings::GeneratorSettings;

/// Which kind of roll produced a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftMode {
    /// Class and skill candidates for a fresh build
    NewBuild,
    /// Skill candidates only, to extend the active build
    Unlock,
}

impl DraftMode {
    /// Unlock mode applies only when enabled and a build exists
    pub fn select(settings: &GeneratorSettings, build: Option<&ActiveBuild>) -> Self {
        if settings.unlock_mode_enabled() && build.is_some() {
            DraftMode::Unlock
        } else {
            DraftMode::NewBuild
        }
    }
}

/// One roll's worth of candidates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub mode: DraftMode,
    /// Always empty in unlock mode
    pub classes: Vec<ClassCandidate>,
    pub skills: Vec<SkillCandidate>,
}

/// Shuffle the pool uniformly and keep the first `count` entries.
///
/// A pool smaller than `count` comes back whole.
pub fn pick_random<T>(mut pool: Vec<T>, count: usize, rng: &mut impl Rng) -> Vec<T> {
    pool.shuffle(rng);
    pool.truncate(count);
    pool
}

/// Roll in whichever mode the settings and build call for
pub fn roll(
    catalog: &Catalog,
    settings: &GeneratorSettings,
    build: Option<&ActiveBuild>,
    available_points: u32,
    rng: &mut impl Rng,
) -> Result<Draft, ValidationError> {
    match (DraftMode::select(settings, build), build) {
        (DraftMode::Unlock, Some(build)) => roll_unlock(catalog, settings, build, available_points, rng),
        _ => roll_new_build(catalog, settings, rng),
    }
}

/// Class and skill candidates for a new build
pub fn roll_new_build(
    catalog: &Catalog,
    settings: &GeneratorSettings,
    rng: &mut impl Rng,
) -> Result<Draft, ValidationError> {
    let skills = skill_pool(catalog, settings);
    if skills.is_empty() {
        return Err(ValidationError::NoSkillsAvailable);
    }
    let classes = class_pool(catalog, settings);
    if classes.is_empty() {
        return Err(ValidationError::NoClassesAvailable);
    }

    let classes = pick_random(classes, settings.class_count(), rng)
        .into_iter()
        .map(|c| ClassCandidate::new(c, rng))
        .collect();
    let skills = pick_random(skills, settings.skill_count(), rng)
        .into_iter()
        .map(|s| SkillCandidate::new(s.clone(), rng))
        .collect();

    Ok(Draft {
        mode: DraftMode::NewBuild,
        classes,
        skills,
    })
}

/// Skill candidates the build does not own yet, paid for with unlock points
pub fn roll_unlock(
    catalog: &Catalog,
    settings: &GeneratorSettings,
    build: &ActiveBuild,
    available_points: u32,
    rng: &mut impl Rng,
) -> Result<Draft, ValidationError> {
    if skill_pool(catalog, settings).is_empty() {
        return Err(ValidationError::NoSkillsAvailable);
    }
    if available_points == 0 {
        return Err(ValidationError::NoUnlockPoints);
    }
    let pool = unlock_pool(catalog, settings, build);
    if pool.is_empty() {
        return Err(ValidationError::AllSkillsUnlocked);
    }

    let skills = pick_random(pool, settings.skill_count(), rng)
        .into_iter()
        .map(|s| SkillCandidate::new(s.clone(), rng))
        .collect();

    Ok(Draft {
        mode: DraftMode::Unlock,
        classes: Vec::new(),
        skills,
    })
}
