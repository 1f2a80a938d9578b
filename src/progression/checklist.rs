//! Progression checklist
//!
//! Tasks the player ticks off while playing a build. Completed tasks feed
//! the unlock-point economy.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ids::unique_id;
use crate::reorder::reorder;
use super::points::available_points;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub is_completed: bool,
}

impl ChecklistItem {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_completed: false,
        }
    }
}

/// The tasks every new build starts with, all unchecked
pub fn default_checklist() -> Vec<ChecklistItem> {
    [
        "Complete Act 10",
        "Unlock the 4th Labyrinth (Eternal)",
        "Complete 100 Atlas Bonus Objectives",
        "Defeat a Conqueror or Guardian Map Boss",
        "Defeat a Pinnacle Boss (e.g. Eater/Exarch)",
        "Reach Level 90",
        "Complete T17 Map Boss",
        "Defeat a Uber Boss",
    ]
    .iter()
    .enumerate()
    .map(|(i, text)| ChecklistItem::new((i + 1).to_string(), *text))
    .collect()
}

/// Ordered checklist. Order matters for display only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    items: Vec<ChecklistItem>,
}

impl Ledger {
    pub fn new() -> Self {
        Self { items: default_checklist() }
    }

    pub fn from_items(items: Vec<ChecklistItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_completed).count()
    }

    /// Rounded share of completed items, 0 for an empty list
    pub fn completion_percentage(&self) -> u32 {
        completion_percentage(&self.items)
    }

    /// Points left to spend for a build holding `unlocked` skills
    pub fn available_points(&self, unlocked: usize) -> u32 {
        available_points(self.completed_count(), unlocked)
    }

    /// Flip an item. Returns its new state, or None for an unknown id.
    pub fn toggle_item(&mut self, id: &str) -> Option<bool> {
        let item = self.items.iter_mut().find(|i| i.id == id)?;
        item.is_completed = !item.is_completed;
        Some(item.is_completed)
    }

    /// Append a task. Blank text is ignored.
    pub fn add_item(&mut self, text: &str, rng: &mut impl Rng) -> Option<&ChecklistItem> {
        if text.trim().is_empty() {
            return None;
        }
        let id = unique_id(rng, self.items.iter().map(|i| i.id.as_str()));
        self.items.push(ChecklistItem::new(id, text));
        self.items.last()
    }

    pub fn delete_item(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        reorder(&mut self.items, from, to)
    }

    /// Back to the default tasks, all unchecked
    pub fn reset_to_default(&mut self) {
        self.items = default_checklist();
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

/// Rounded share of completed items in any checklist, 0 when empty
pub fn completion_percentage(items: &[ChecklistItem]) -> u32 {
    if items.is_empty() {
        return 0;
    }
    let done = items.iter().filter(|i| i.is_completed).count();
    ((done as f64 / items.len() as f64) * 100.0).round() as u32
}
