//! Draft engine
//!
//! Turns the catalog and the generator settings into randomized candidate
//! lists, either for a brand new build or for unlocking one more skill.

pub mod settings;
pub mod candidates;
pub mod pool;
pub mod engine;
pub mod state;

pub use settings::{GeneratorSettings, MIN_CANDIDATES, MAX_CANDIDATES, DEFAULT_ROLL_DELAY};
pub use candidates::{ClassCandidate, SkillCandidate, SkillPick};
pub use pool::{class_pool, skill_pool, unlock_pool, class_pool_preview, skill_pool_preview, BASE_CLASS_GROUP};
pub use engine::{Draft, DraftMode, pick_random, roll, roll_new_build, roll_unlock};
pub use state::{DraftState, PendingRoll};
