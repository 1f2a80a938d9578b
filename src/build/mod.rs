//! Active build
//!
//! The single committed build and the transitions that shape it.

pub mod active;
pub mod state;

pub use active::{ActiveBuild, PobLink, DEFAULT_LINK_NAME};
pub use state::{BuildState, now_millis};
