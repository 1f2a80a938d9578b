//! Read-only share preview
//!
//! Owns a decoded snapshot and exposes display values. Nothing here can
//! reach the viewer's own session state.

use crate::build::{ActiveBuild, PobLink};
use crate::catalog::SkillRecord;
use crate::error::DecodeError;
use crate::progression::{available_points, completion_percentage, ChecklistItem};
use super::codec::{decode, ShareSnapshot};
use super::link::parse_share_url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePreview {
    snapshot: ShareSnapshot,
}

impl SharePreview {
    pub fn from_token(token: &str) -> Result<Self, DecodeError> {
        decode(token).map(|snapshot| Self { snapshot })
    }

    pub fn from_url(url: &str) -> Result<Self, DecodeError> {
        parse_share_url(url).map(|snapshot| Self { snapshot })
    }

    /// Accept either a full share link or a bare token
    pub fn open(input: &str) -> Result<Self, DecodeError> {
        let input = input.trim();
        if input.contains('?') || input.contains('#') {
            Self::from_url(input)
        } else {
            Self::from_token(input)
        }
    }

    pub fn build(&self) -> &ActiveBuild {
        &self.snapshot.build
    }

    pub fn checklist(&self) -> &[ChecklistItem] {
        &self.snapshot.checklist
    }

    pub fn unlocked_skills(&self) -> &[SkillRecord] {
        self.snapshot.build.unlocked()
    }

    pub fn links(&self) -> &[PobLink] {
        &self.snapshot.build.pob_links
    }

    pub fn completed_count(&self) -> usize {
        self.checklist().iter().filter(|i| i.is_completed).count()
    }

    pub fn completion_percentage(&self) -> u32 {
        completion_percentage(self.checklist())
    }

    pub fn available_points(&self) -> u32 {
        available_points(self.completed_count(), self.unlocked_skills().len())
    }
}
