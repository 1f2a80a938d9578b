//! Generator settings

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fewest candidates a roll may ask for
pub const MIN_CANDIDATES: usize = 1;
/// Most candidates a roll may ask for
pub const MAX_CANDIDATES: usize = 10;
/// Pause between starting a roll and showing its results
pub const DEFAULT_ROLL_DELAY: Duration = Duration::from_millis(600);

/// User-facing knobs of the randomizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorSettings {
    class_count: usize,
    skill_count: usize,
    /// Roll specific ascendancies instead of base classes
    ascendancy_mode: bool,
    /// Only skills under these tags are eligible
    selected_tags: BTreeSet<String>,
    /// Spend checklist points on extra skills once a build exists
    unlock_mode_enabled: bool,
    roll_delay_ms: u64,
}

impl GeneratorSettings {
    /// Defaults with every given tag selected
    pub fn new(tags: impl IntoIterator<Item = String>) -> Self {
        Self {
            selected_tags: tags.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn class_count(&self) -> usize {
        clamp_count(self.class_count)
    }

    pub fn skill_count(&self) -> usize {
        clamp_count(self.skill_count)
    }

    /// Stores the count clamped to 1..=10 and returns it
    pub fn set_class_count(&mut self, count: usize) -> usize {
        self.class_count = clamp_count(count);
        self.class_count
    }

    /// Stores the count clamped to 1..=10 and returns it
    pub fn set_skill_count(&mut self, count: usize) -> usize {
        self.skill_count = clamp_count(count);
        self.skill_count
    }

    pub fn ascendancy_mode(&self) -> bool {
        self.ascendancy_mode
    }

    pub fn set_ascendancy_mode(&mut self, enabled: bool) {
        self.ascendancy_mode = enabled;
    }

    pub fn unlock_mode_enabled(&self) -> bool {
        self.unlock_mode_enabled
    }

    pub fn set_unlock_mode_enabled(&mut self, enabled: bool) {
        self.unlock_mode_enabled = enabled;
    }

    pub fn roll_delay(&self) -> Duration {
        Duration::from_millis(self.roll_delay_ms)
    }

    pub fn set_roll_delay(&mut self, delay: Duration) {
        self.roll_delay_ms = delay.as_millis().min(u64::MAX as u128) as u64;
    }

    pub fn selected_tags(&self) -> &BTreeSet<String> {
        &self.selected_tags
    }

    pub fn is_tag_selected(&self, tag: &str) -> bool {
        self.selected_tags.contains(tag)
    }

    /// Returns true when the tag is now selected
    pub fn toggle_selected_tag(&mut self, tag: &str) -> bool {
        if self.selected_tags.remove(tag) {
            false
        } else {
            self.selected_tags.insert(tag.to_string());
            true
        }
    }

    pub fn set_selected_tags(&mut self, tags: impl IntoIterator<Item = String>) {
        self.selected_tags = tags.into_iter().collect();
    }

    pub fn clear_selected_tags(&mut self) {
        self.selected_tags.clear();
    }

    /// True when every one of `tags` is selected and there is at least one
    pub fn all_selected<'a>(&self, tags: impl IntoIterator<Item = &'a String>) -> bool {
        let mut any = false;
        for tag in tags {
            any = true;
            if !self.selected_tags.contains(tag) {
                return false;
            }
        }
        any
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            class_count: 3,
            skill_count: 3,
            ascendancy_mode: true,
            selected_tags: BTreeSet::new(),
            unlock_mode_enabled: false,
            roll_delay_ms: DEFAULT_ROLL_DELAY.as_millis() as u64,
        }
    }
}

fn clamp_count(count: usize) -> usize {
    count.clamp(MIN_CANDIDATES, MAX_CANDIDATES)
}
