//! Application state - the session every front end drives

mod state;

pub use state::{AppState, Phase};
pub use crate::draft::GeneratorSettings;
