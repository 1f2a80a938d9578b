//! Error taxonomy
//!
//! Every failure is recoverable. Validation failures surface as inline
//! messages, decode failures as a broken-link view, persistence failures
//! only reach the log.

use thiserror::Error;

/// A user action was rejected; state is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Skill \"{0}\" already exists.")]
    DuplicateSkill(String),
    #[error("{0} cannot be empty.")]
    BlankField(&'static str),
    #[error("No skills available. Please select at least one tag filter or adjust data exclusions.")]
    NoSkillsAvailable,
    #[error("No classes available. Please enable some classes in the catalog.")]
    NoClassesAvailable,
    #[error("No Unlock Points available. Complete more tasks in the build checklist.")]
    NoUnlockPoints,
    #[error("All available skills have already been unlocked!")]
    AllSkillsUnlocked,
    #[error("You already have \"{0}\" unlocked.")]
    AlreadyUnlocked(String),
    #[error("No active build.")]
    NoActiveBuild,
    #[error("Select {0} before finalizing.")]
    MissingSelection(&'static str),
    #[error("No candidate at position {0}.")]
    NoSuchCandidate(usize),
    #[error("A roll is already in progress.")]
    RollInProgress,
}

/// A share token could not be turned back into a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("No build data found in link.")]
    MissingData,
    #[error("Failed to load shared build. The link might be broken. ({0})")]
    Malformed(String),
    #[error("Invalid build data format.")]
    Incomplete,
}

/// A share token could not be produced.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("No active build to share.")]
    NoActiveBuild,
    #[error("Could not generate share link: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The durable store rejected a read or write.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
