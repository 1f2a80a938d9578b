//! Draft candidates
//!
//! Ephemeral roll results. The `id` is only a rendering key; a skill
//! candidate is identified by its skill name.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{ClassRecord, SkillRecord};
use crate::ids::new_id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCandidate {
    pub data: ClassRecord,
    pub id: String,
}

impl ClassCandidate {
    pub fn new(data: ClassRecord, rng: &mut impl Rng) -> Self {
        Self { data, id: new_id(rng) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCandidate {
    pub main: SkillRecord,
    /// Never filled by the engine yet
    pub supports: Vec<SkillRecord>,
    pub id: String,
}

impl SkillCandidate {
    pub fn new(main: SkillRecord, rng: &mut impl Rng) -> Self {
        Self {
            main,
            supports: Vec::new(),
            id: new_id(rng),
        }
    }

    /// The part of the candidate that survives selection
    pub fn pick(&self) -> SkillPick {
        SkillPick {
            main: self.main.clone(),
            supports: self.supports.clone(),
        }
    }
}

/// A selected skill candidate, waiting to be finalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillPick {
    pub main: SkillRecord,
    pub supports: Vec<SkillRecord>,
}

impl SkillPick {
    pub fn new(main: SkillRecord) -> Self {
        Self { main, supports: Vec::new() }
    }
}
