//! Draft-in-progress state
//!
//! Holds the visible candidate lists, the user's pending selections and at
//! most one roll waiting out its animation delay.

use std::time::{Duration, Instant};

use crate::catalog::ClassRecord;
use crate::error::ValidationError;
use super::candidates::{ClassCandidate, SkillCandidate, SkillPick};
use super::engine::Draft;

/// A computed roll that becomes visible once its delay has elapsed
#[derive(Debug, Clone)]
pub struct PendingRoll {
    draft: Draft,
    ready_at: Instant,
}

impl PendingRoll {
    pub fn new(draft: Draft, started: Instant, delay: Duration) -> Self {
        Self {
            draft,
            ready_at: started + delay,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.ready_at
    }

    /// Time left until the roll may be shown
    pub fn remaining(&self, now: Instant) -> Duration {
        self.ready_at.saturating_duration_since(now)
    }
}

/// Candidate lists and selections between a roll and its finalization
#[derive(Debug, Clone, Default)]
pub struct DraftState {
    pub classes: Vec<ClassCandidate>,
    pub skills: Vec<SkillCandidate>,
    pub selected_class: Option<ClassRecord>,
    pub selected_skill: Option<SkillPick>,
    pending: Option<PendingRoll>,
}

impl DraftState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored slices. Pending rolls are never stored.
    pub fn restore(
        classes: Vec<ClassCandidate>,
        skills: Vec<SkillCandidate>,
        selected_class: Option<ClassRecord>,
        selected_skill: Option<SkillPick>,
    ) -> Self {
        Self {
            classes,
            skills,
            selected_class,
            selected_skill,
            pending: None,
        }
    }

    /// True while a roll is waiting to be committed
    pub fn is_rolling(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PendingRoll> {
        self.pending.as_ref()
    }

    /// Anything rolled or selected that has not been finalized
    pub fn has_results(&self) -> bool {
        !self.classes.is_empty() || !self.skills.is_empty()
    }

    /// Start a roll: drop the old candidates and selections and park the new
    /// draft until its delay is over.
    pub fn begin(&mut self, pending: PendingRoll) -> Result<(), ValidationError> {
        if self.is_rolling() {
            return Err(ValidationError::RollInProgress);
        }
        self.clear();
        self.pending = Some(pending);
        Ok(())
    }

    /// Show the pending roll if its delay has elapsed
    pub fn commit_if_due(&mut self, now: Instant) -> bool {
        let due = self.pending.as_ref().is_some_and(|p| p.is_due(now));
        due && self.commit()
    }

    /// Show the pending roll right away, both lists at once
    pub fn commit(&mut self) -> bool {
        match self.pending.take() {
            Some(PendingRoll { draft, .. }) => {
                self.classes = draft.classes;
                self.skills = draft.skills;
                true
            }
            None => false,
        }
    }

    /// Drop candidates and selections. A pending roll is kept.
    pub fn clear(&mut self) {
        self.classes.clear();
        self.skills.clear();
        self.selected_class = None;
        self.selected_skill = None;
    }

    /// Drop everything, including a roll still waiting out its delay
    pub fn reset(&mut self) {
        self.clear();
        self.pending = None;
    }

    /// Select the class candidate at `index`; selecting it again deselects
    pub fn select_class(&mut self, index: usize) -> Result<Option<&ClassRecord>, ValidationError> {
        let candidate = self
            .classes
            .get(index)
            .ok_or(ValidationError::NoSuchCandidate(index))?;
        if self.selected_class.as_ref() == Some(&candidate.data) {
            self.selected_class = None;
        } else {
            self.selected_class = Some(candidate.data.clone());
        }
        Ok(self.selected_class.as_ref())
    }

    /// Select the skill candidate at `index`; selecting it again deselects
    pub fn select_skill(&mut self, index: usize) -> Result<Option<&SkillPick>, ValidationError> {
        let candidate = self
            .skills
            .get(index)
            .ok_or(ValidationError::NoSuchCandidate(index))?;
        let already = self
            .selected_skill
            .as_ref()
            .is_some_and(|s| s.main.name == candidate.main.name);
        self.selected_skill = if already { None } else { Some(candidate.pick()) };
        Ok(self.selected_skill.as_ref())
    }
}
