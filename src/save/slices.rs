//! State slices and their storage keys

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::PersistenceError;
use super::store::KeyValueStore;

/// One independently stored piece of application state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slice {
    ActiveBuild,
    Checklist,
    Skills,
    Classes,
    ExcludedTags,
    ExcludedAscendancies,
    HiddenSkills,
    CollapsedTags,
    CollapsedClasses,
    GeneratorSettings,
    DraftClasses,
    DraftSkills,
    DraftSelectedClass,
    DraftSelectedSkill,
}

impl Slice {
    pub const ALL: [Slice; 14] = [
        Slice::ActiveBuild,
        Slice::Checklist,
        Slice::Skills,
        Slice::Classes,
        Slice::ExcludedTags,
        Slice::ExcludedAscendancies,
        Slice::HiddenSkills,
        Slice::CollapsedTags,
        Slice::CollapsedClasses,
        Slice::GeneratorSettings,
        Slice::DraftClasses,
        Slice::DraftSkills,
        Slice::DraftSelectedClass,
        Slice::DraftSelectedSkill,
    ];

    /// Candidate lists and selections
    pub const DRAFT: [Slice; 4] = [
        Slice::DraftClasses,
        Slice::DraftSkills,
        Slice::DraftSelectedClass,
        Slice::DraftSelectedSkill,
    ];

    /// Storage key of the slice
    pub fn key(self) -> &'static str {
        match self {
            Slice::ActiveBuild => "active_build",
            Slice::Checklist => "checklist",
            Slice::Skills => "skills",
            Slice::Classes => "classes",
            Slice::ExcludedTags => "excluded_tags",
            Slice::ExcludedAscendancies => "excluded_ascendancies",
            Slice::HiddenSkills => "hidden_skills",
            Slice::CollapsedTags => "collapsed_tags",
            Slice::CollapsedClasses => "collapsed_classes",
            Slice::GeneratorSettings => "generator_settings",
            Slice::DraftClasses => "draft_classes",
            Slice::DraftSkills => "draft_skills",
            Slice::DraftSelectedClass => "draft_selected_class",
            Slice::DraftSelectedSkill => "draft_selected_skill",
        }
    }
}

/// Read a slice. Missing, unreadable, corrupt and `null` entries all come
/// back as None so the caller can use its default.
pub fn load_slice<T: DeserializeOwned>(store: &dyn KeyValueStore, slice: Slice) -> Option<T> {
    let key = slice.key();
    let text = match store.get(key) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Failed to read {}: {}, using default", key, e);
            return None;
        }
    };

    let value: serde_json::Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Failed to parse {}: {}, using default", key, e);
            return None;
        }
    };
    if value.is_null() {
        return None;
    }

    match serde_json::from_value(value) {
        Ok(data) => Some(data),
        Err(e) => {
            log::warn!("Stored {} has an unexpected shape: {}, using default", key, e);
            None
        }
    }
}

/// Write a slice as JSON text
pub fn save_slice<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    slice: Slice,
    value: &T,
) -> Result<(), PersistenceError> {
    let json = serde_json::to_string(value)?;
    store.set(slice.key(), &json)
}

/// Remove a slice so the next load falls back to its default
pub fn clear_slice(store: &mut dyn KeyValueStore, slice: Slice) -> Result<(), PersistenceError> {
    store.remove(slice.key())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::MemoryStore;
    use std::collections::BTreeSet;

    #[test]
    fn test_keys_are_unique() {
        let keys: BTreeSet<_> = Slice::ALL.iter().map(|s| s.key()).collect();
        assert_eq!(keys.len(), Slice::ALL.len());
    }

    #[test]
    fn test_round_trip() {
        let mut store = MemoryStore::new();
        let tags: BTreeSet<String> = ["Spell".to_string()].into_iter().collect();
        save_slice(&mut store, Slice::ExcludedTags, &tags).unwrap();
        assert_eq!(load_slice::<BTreeSet<String>>(&store, Slice::ExcludedTags), Some(tags));
    }

    #[test]
    fn test_fallbacks() {
        let mut store = MemoryStore::new();
        assert_eq!(load_slice::<Vec<String>>(&store, Slice::Skills), None);

        store.set("skills", "{not json").unwrap();
        assert_eq!(load_slice::<Vec<String>>(&store, Slice::Skills), None);

        store.set("skills", "null").unwrap();
        assert_eq!(load_slice::<Vec<String>>(&store, Slice::Skills), None);

        store.set("skills", r#"{"wrong":"shape"}"#).unwrap();
        assert_eq!(load_slice::<Vec<String>>(&store, Slice::Skills), None);
    }

    #[test]
    fn test_clear_slice() {
        let mut store = MemoryStore::new();
        save_slice(&mut store, Slice::Checklist, &vec!["a".to_string()]).unwrap();
        clear_slice(&mut store, Slice::Checklist).unwrap();
        assert_eq!(store.get("checklist").unwrap(), None);
        // Clearing a missing slice is fine
        clear_slice(&mut store, Slice::Checklist).unwrap();
    }
}
