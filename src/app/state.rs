//! Session state machine
//!
//! Owns the catalog, generator settings, draft, active build and checklist,
//! and mirrors every mutation batch to the key-value store. Store failures
//! are logged and the in-memory state carries on.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::build::{now_millis, ActiveBuild, BuildState, PobLink};
use crate::catalog::{Catalog, CatalogDefaults, CatalogFlags, ClassExclusion, ClassRecord, SkillRecord};
use crate::draft::{self, DraftMode, DraftState, GeneratorSettings, PendingRoll, SkillPick};
use crate::error::{EncodeError, PersistenceError, ValidationError};
use crate::progression::{ChecklistItem, Ledger};
use crate::save::{clear_slice, load_slice, save_slice, KeyValueStore, Slice};
use crate::share::{self, ShareSnapshot};

/// Where the session is in the build lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing rolled, no build
    NoBuild,
    /// Candidates rolled (or rolling) for a first build
    DraftInProgress,
    /// A build exists; unlock drafts stay in this phase
    BuildActive,
}

/// The whole session
pub struct AppState {
    catalog: Catalog,
    settings: GeneratorSettings,
    draft: DraftState,
    builds: BuildState,
    ledger: Ledger,
    /// Shipped lists, used on reset
    defaults: CatalogDefaults,
    store: Box<dyn KeyValueStore>,
    rng: StdRng,
}

impl AppState {
    /// Fresh session: shipped catalog, default settings, no build
    pub fn new(defaults: CatalogDefaults, store: Box<dyn KeyValueStore>) -> Self {
        Self {
            catalog: Catalog::new(&defaults),
            settings: GeneratorSettings::new(defaults.tags()),
            draft: DraftState::new(),
            builds: BuildState::new(),
            ledger: Ledger::new(),
            defaults,
            store,
            rng: StdRng::from_entropy(),
        }
    }

    /// Restore a session from the store. Each slice falls back to its
    /// default on its own.
    pub fn load(defaults: CatalogDefaults, store: Box<dyn KeyValueStore>) -> Self {
        let s = &*store;

        let flags = CatalogFlags {
            excluded_tags: load_slice(s, Slice::ExcludedTags).unwrap_or_default(),
            excluded_ascendancies: load_slice(s, Slice::ExcludedAscendancies).unwrap_or_default(),
            hidden_skills: load_slice(s, Slice::HiddenSkills).unwrap_or_default(),
            collapsed_tags: load_slice(s, Slice::CollapsedTags).unwrap_or_default(),
            collapsed_classes: load_slice(s, Slice::CollapsedClasses).unwrap_or_default(),
        };
        let catalog = Catalog::from_parts(
            load_slice(s, Slice::Skills).unwrap_or_else(|| defaults.skills.clone()),
            load_slice(s, Slice::Classes).unwrap_or_else(|| defaults.classes.clone()),
            flags,
        );
        let settings = load_settings(s, &defaults);
        let builds = BuildState::restore(load_slice(s, Slice::ActiveBuild));
        let ledger = load_slice(s, Slice::Checklist)
            .map(Ledger::from_items)
            .unwrap_or_default();
        let draft = DraftState::restore(
            load_slice(s, Slice::DraftClasses).unwrap_or_default(),
            load_slice(s, Slice::DraftSkills).unwrap_or_default(),
            load_slice(s, Slice::DraftSelectedClass),
            load_slice(s, Slice::DraftSelectedSkill),
        );

        log::info!(
            "Session loaded: {} skills, {} classes, build {}",
            catalog.skills().len(),
            catalog.classes().len(),
            builds.build().map_or("none", |b| b.display_name())
        );

        Self {
            catalog,
            settings,
            draft,
            builds,
            ledger,
            defaults,
            store,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the session RNG with a seeded one
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Hand back the store, e.g. to reload from it
    pub fn into_store(self) -> Box<dyn KeyValueStore> {
        self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub fn draft(&self) -> &DraftState {
        &self.draft
    }

    pub fn build(&self) -> Option<&ActiveBuild> {
        self.builds.build()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn defaults(&self) -> &CatalogDefaults {
        &self.defaults
    }

    pub fn phase(&self) -> Phase {
        if self.builds.is_active() {
            Phase::BuildActive
        } else if self.draft.is_rolling() || self.draft.has_results() {
            Phase::DraftInProgress
        } else {
            Phase::NoBuild
        }
    }

    /// Rolls and finalizes extend the active build
    pub fn is_unlock_mode(&self) -> bool {
        DraftMode::select(&self.settings, self.builds.build()) == DraftMode::Unlock
    }

    pub fn available_points(&self) -> u32 {
        self.ledger.available_points(self.builds.unlocked_count())
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Write every slice
    pub fn save_all(&mut self) {
        self.persist(&Slice::ALL);
    }

    fn persist(&mut self, slices: &[Slice]) {
        for &slice in slices {
            if let Err(e) = self.save(slice) {
                log::warn!("Failed to save {}: {}", slice.key(), e);
            }
        }
    }

    fn save(&mut self, slice: Slice) -> Result<(), PersistenceError> {
        let store = &mut *self.store;
        let flags = self.catalog.flags();
        match slice {
            Slice::ActiveBuild => match self.builds.build() {
                Some(build) => save_slice(store, slice, build),
                None => clear_slice(store, slice),
            },
            Slice::Checklist => save_slice(store, slice, self.ledger.items()),
            Slice::Skills => save_slice(store, slice, self.catalog.skills()),
            Slice::Classes => save_slice(store, slice, self.catalog.classes()),
            Slice::ExcludedTags => save_slice(store, slice, &flags.excluded_tags),
            Slice::ExcludedAscendancies => save_slice(store, slice, &flags.excluded_ascendancies),
            Slice::HiddenSkills => save_slice(store, slice, &flags.hidden_skills),
            Slice::CollapsedTags => save_slice(store, slice, &flags.collapsed_tags),
            Slice::CollapsedClasses => save_slice(store, slice, &flags.collapsed_classes),
            Slice::GeneratorSettings => save_slice(store, slice, &self.settings),
            Slice::DraftClasses => save_slice(store, slice, &self.draft.classes),
            Slice::DraftSkills => save_slice(store, slice, &self.draft.skills),
            Slice::DraftSelectedClass => save_slice(store, slice, &self.draft.selected_class),
            Slice::DraftSelectedSkill => save_slice(store, slice, &self.draft.selected_skill),
        }
    }

    // ------------------------------------------------------------------
    // Drafting
    // ------------------------------------------------------------------

    /// Validate and compute a roll, then park it until the roll delay has
    /// passed. Old candidates and selections are dropped.
    pub fn begin_roll(&mut self, now: Instant) -> Result<(), ValidationError> {
        self.ensure_idle()?;
        let points = self.available_points();
        let rolled = draft::roll(&self.catalog, &self.settings, self.builds.build(), points, &mut self.rng)?;
        log::debug!(
            "Rolled {:?}: {} classes, {} skills",
            rolled.mode,
            rolled.classes.len(),
            rolled.skills.len()
        );
        self.draft.begin(PendingRoll::new(rolled, now, self.settings.roll_delay()))?;
        self.persist(&Slice::DRAFT);
        Ok(())
    }

    /// Advance time. Shows a due roll and reports whether it did.
    pub fn update(&mut self, now: Instant) -> bool {
        let committed = self.draft.commit_if_due(now);
        if committed {
            self.persist(&Slice::DRAFT);
        }
        committed
    }

    /// Show the pending roll without waiting
    pub fn finish_roll(&mut self) -> bool {
        let committed = self.draft.commit();
        if committed {
            self.persist(&Slice::DRAFT);
        }
        committed
    }

    /// Roll with no delay
    pub fn roll_now(&mut self) -> Result<(), ValidationError> {
        self.begin_roll(Instant::now())?;
        self.finish_roll();
        Ok(())
    }

    pub fn is_rolling(&self) -> bool {
        self.draft.is_rolling()
    }

    /// Time until the pending roll shows, if one is pending
    pub fn roll_remaining(&self, now: Instant) -> Option<Duration> {
        self.draft.pending().map(|p| p.remaining(now))
    }

    pub fn select_class(&mut self, index: usize) -> Result<Option<&ClassRecord>, ValidationError> {
        self.draft.select_class(index)?;
        self.persist(&[Slice::DraftSelectedClass]);
        Ok(self.draft.selected_class.as_ref())
    }

    pub fn select_skill(&mut self, index: usize) -> Result<Option<&SkillPick>, ValidationError> {
        self.draft.select_skill(index)?;
        self.persist(&[Slice::DraftSelectedSkill]);
        Ok(self.draft.selected_skill.as_ref())
    }

    fn ensure_idle(&self) -> Result<(), ValidationError> {
        if self.draft.is_rolling() {
            Err(ValidationError::RollInProgress)
        } else {
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // Build lifecycle
    // ------------------------------------------------------------------

    /// Finalize in whichever mode applies right now
    pub fn finalize(&mut self) -> Result<&ActiveBuild, ValidationError> {
        if self.is_unlock_mode() {
            self.finalize_unlock()
        } else {
            self.finalize_new_build()
        }
    }

    /// Commit the selected class and skill as the new build. The checklist
    /// starts over.
    pub fn finalize_new_build(&mut self) -> Result<&ActiveBuild, ValidationError> {
        self.ensure_idle()?;
        let class = self
            .draft
            .selected_class
            .clone()
            .ok_or(ValidationError::MissingSelection("a class"))?;
        let pick = self
            .draft
            .selected_skill
            .clone()
            .ok_or(ValidationError::MissingSelection("a skill"))?;

        self.builds.finalize_new_build(class, pick, now_millis());
        self.ledger.reset_to_default();
        self.draft.clear();

        self.persist(&[Slice::ActiveBuild, Slice::Checklist]);
        self.persist(&Slice::DRAFT);
        self.builds.build().ok_or(ValidationError::NoActiveBuild)
    }

    /// Add the selected skill to the active build
    pub fn finalize_unlock(&mut self) -> Result<&ActiveBuild, ValidationError> {
        self.ensure_idle()?;
        if !self.builds.is_active() {
            return Err(ValidationError::NoActiveBuild);
        }
        let pick = self
            .draft
            .selected_skill
            .clone()
            .ok_or(ValidationError::MissingSelection("a skill"))?;

        self.builds.finalize_unlock(pick)?;
        self.draft.clear();

        self.persist(&[Slice::ActiveBuild]);
        self.persist(&Slice::DRAFT);
        self.builds.build().ok_or(ValidationError::NoActiveBuild)
    }

    /// Discard the build, its checklist progress and any draft
    pub fn start_new_build(&mut self) {
        self.builds.reset();
        self.ledger.reset_to_default();
        self.draft.reset();
        self.persist(&[Slice::ActiveBuild, Slice::Checklist]);
        self.persist(&Slice::DRAFT);
    }

    pub fn set_active_skill(&mut self, skill: SkillRecord) -> Result<(), ValidationError> {
        self.builds.set_active_skill(skill)?;
        self.persist(&[Slice::ActiveBuild]);
        Ok(())
    }

    pub fn rename_build(&mut self, name: &str) -> Result<(), ValidationError> {
        self.builds.rename(name)?;
        self.persist(&[Slice::ActiveBuild]);
        Ok(())
    }

    pub fn add_pob_link(&mut self, name: &str, url: &str) -> Result<PobLink, ValidationError> {
        let link = self.builds.add_pob_link(name, url, &mut self.rng)?.clone();
        self.persist(&[Slice::ActiveBuild]);
        Ok(link)
    }

    pub fn remove_pob_link(&mut self, id: &str) -> Result<bool, ValidationError> {
        let removed = self.builds.remove_pob_link(id)?;
        if removed {
            self.persist(&[Slice::ActiveBuild]);
        }
        Ok(removed)
    }

    pub fn reorder_pob_links(&mut self, from: usize, to: usize) -> Result<bool, ValidationError> {
        let moved = self.builds.reorder_pob_links(from, to)?;
        if moved {
            self.persist(&[Slice::ActiveBuild]);
        }
        Ok(moved)
    }

    // ------------------------------------------------------------------
    // Checklist
    // ------------------------------------------------------------------

    pub fn toggle_checklist_item(&mut self, id: &str) -> Option<bool> {
        let done = self.ledger.toggle_item(id)?;
        self.persist(&[Slice::Checklist]);
        Some(done)
    }

    pub fn add_checklist_item(&mut self, text: &str) -> Option<ChecklistItem> {
        let item = self.ledger.add_item(text, &mut self.rng)?.clone();
        self.persist(&[Slice::Checklist]);
        Some(item)
    }

    pub fn delete_checklist_item(&mut self, id: &str) -> bool {
        let removed = self.ledger.delete_item(id);
        if removed {
            self.persist(&[Slice::Checklist]);
        }
        removed
    }

    pub fn reorder_checklist(&mut self, from: usize, to: usize) -> bool {
        let moved = self.ledger.reorder(from, to);
        if moved {
            self.persist(&[Slice::Checklist]);
        }
        moved
    }

    pub fn reset_checklist(&mut self) {
        self.ledger.reset_to_default();
        self.persist(&[Slice::Checklist]);
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    pub fn add_skill(&mut self, skill: SkillRecord) -> Result<SkillRecord, ValidationError> {
        let added = self.catalog.add_skill(skill)?.clone();
        self.persist(&[Slice::Skills]);
        Ok(added)
    }

    pub fn delete_skill(&mut self, name: &str) -> bool {
        let removed = self.catalog.delete_skill(name);
        self.persist(&[Slice::Skills, Slice::HiddenSkills]);
        removed
    }

    pub fn delete_tag(&mut self, tag: &str) -> usize {
        let removed = self.catalog.delete_tag(tag);
        self.persist(&[Slice::Skills]);
        removed
    }

    pub fn delete_class(&mut self, class: &str) -> usize {
        let removed = self.catalog.delete_class(class);
        self.persist(&[Slice::Classes]);
        removed
    }

    pub fn delete_ascendancy(&mut self, ascendancy: &str) -> usize {
        let removed = self.catalog.delete_ascendancy(ascendancy);
        self.persist(&[Slice::Classes]);
        removed
    }

    pub fn toggle_tag_exclusion(&mut self, tag: &str) -> bool {
        let excluded = self.catalog.toggle_tag_exclusion(tag);
        self.persist(&[Slice::ExcludedTags]);
        excluded
    }

    pub fn toggle_ascendancy_exclusion(&mut self, ascendancy: &str) -> bool {
        let excluded = self.catalog.toggle_ascendancy_exclusion(ascendancy);
        self.persist(&[Slice::ExcludedAscendancies]);
        excluded
    }

    pub fn toggle_class_exclusion(&mut self, class: &str) -> ClassExclusion {
        let state = self.catalog.toggle_class_exclusion(class);
        self.persist(&[Slice::ExcludedAscendancies]);
        state
    }

    pub fn toggle_skill_visibility(&mut self, name: &str) -> bool {
        let hidden = self.catalog.toggle_skill_visibility(name);
        self.persist(&[Slice::HiddenSkills]);
        hidden
    }

    pub fn toggle_tag_collapse(&mut self, tag: &str) -> bool {
        let collapsed = self.catalog.toggle_tag_collapse(tag);
        self.persist(&[Slice::CollapsedTags]);
        collapsed
    }

    pub fn toggle_class_collapse(&mut self, class: &str) -> bool {
        let collapsed = self.catalog.toggle_class_collapse(class);
        self.persist(&[Slice::CollapsedClasses]);
        collapsed
    }

    /// Shipped catalog, every tag selected, no build, fresh checklist
    pub fn reset_to_defaults(&mut self) {
        self.catalog.reset_to_defaults(&self.defaults);
        self.settings.set_selected_tags(self.defaults.tags());
        self.builds.reset();
        self.ledger.reset_to_default();
        self.draft.reset();
        self.save_all();
    }

    // ------------------------------------------------------------------
    // Generator settings
    // ------------------------------------------------------------------

    pub fn set_class_count(&mut self, count: usize) -> usize {
        let stored = self.settings.set_class_count(count);
        self.persist(&[Slice::GeneratorSettings]);
        stored
    }

    pub fn set_skill_count(&mut self, count: usize) -> usize {
        let stored = self.settings.set_skill_count(count);
        self.persist(&[Slice::GeneratorSettings]);
        stored
    }

    pub fn set_ascendancy_mode(&mut self, enabled: bool) {
        self.settings.set_ascendancy_mode(enabled);
        self.persist(&[Slice::GeneratorSettings]);
    }

    pub fn set_unlock_mode_enabled(&mut self, enabled: bool) {
        self.settings.set_unlock_mode_enabled(enabled);
        self.persist(&[Slice::GeneratorSettings]);
    }

    pub fn set_roll_delay(&mut self, delay: Duration) {
        self.settings.set_roll_delay(delay);
        self.persist(&[Slice::GeneratorSettings]);
    }

    pub fn toggle_selected_tag(&mut self, tag: &str) -> bool {
        let selected = self.settings.toggle_selected_tag(tag);
        self.persist(&[Slice::GeneratorSettings]);
        selected
    }

    /// Select every tag that is not excluded
    pub fn select_all_tags(&mut self) {
        self.settings.set_selected_tags(self.catalog.available_tags());
        self.persist(&[Slice::GeneratorSettings]);
    }

    pub fn clear_selected_tags(&mut self) {
        self.settings.clear_selected_tags();
        self.persist(&[Slice::GeneratorSettings]);
    }

    pub fn all_tags_selected(&self) -> bool {
        self.settings.all_selected(&self.catalog.available_tags())
    }

    pub fn class_pool_preview(&self) -> Vec<(String, Vec<String>)> {
        draft::class_pool_preview(&self.catalog, &self.settings)
    }

    pub fn skill_pool_preview(&self) -> BTreeMap<&str, Vec<&str>> {
        draft::skill_pool_preview(&self.catalog, &self.settings)
    }

    // ------------------------------------------------------------------
    // Sharing
    // ------------------------------------------------------------------

    pub fn share_snapshot(&self) -> Result<ShareSnapshot, EncodeError> {
        let build = self.builds.build().ok_or(EncodeError::NoActiveBuild)?;
        Ok(ShareSnapshot::new(build.clone(), self.ledger.items().to_vec()))
    }

    pub fn share_token(&self) -> Result<String, EncodeError> {
        share::encode(&self.share_snapshot()?)
    }

    /// Share link rooted at `base_url`
    pub fn share_url(&self, base_url: &str) -> Result<String, EncodeError> {
        Ok(share::share_url(base_url, &self.share_token()?))
    }
}

/// Settings stored before the tag filter existed get every shipped tag
fn load_settings(store: &dyn KeyValueStore, defaults: &CatalogDefaults) -> GeneratorSettings {
    let Some(value) = load_slice::<serde_json::Value>(store, Slice::GeneratorSettings) else {
        return GeneratorSettings::new(defaults.tags());
    };
    let has_tags = value.get("selectedTags").is_some_and(|t| !t.is_null());
    match serde_json::from_value::<GeneratorSettings>(value) {
        Ok(mut settings) => {
            if !has_tags {
                settings.set_selected_tags(defaults.tags());
            }
            settings
        }
        Err(e) => {
            log::warn!("Stored {} has an unexpected shape: {}, using default", Slice::GeneratorSettings.key(), e);
            GeneratorSettings::new(defaults.tags())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::MemoryStore;

    fn test_defaults() -> CatalogDefaults {
        CatalogDefaults::from_lists(
            vec![
                SkillRecord::new("Arc", "Spell", "#"),
                SkillRecord::new("Spark", "Spell", "#"),
                SkillRecord::new("Cyclone", "Attack", "#"),
                SkillRecord::new("Raise Zombie", "Minion", "#"),
            ],
            vec![
                ClassRecord::new("Witch", "Elementalist"),
                ClassRecord::new("Witch", "Necromancer"),
                ClassRecord::new("Ranger", "Deadeye"),
            ],
        )
    }

    fn test_app() -> AppState {
        AppState::new(test_defaults(), Box::new(MemoryStore::new())).with_seed(7)
    }

    fn with_build(app: &mut AppState) {
        app.roll_now().unwrap();
        app.select_class(0).unwrap();
        app.select_skill(0).unwrap();
        app.finalize().unwrap();
    }

    /// Always fails to write
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
            Err(std::io::Error::other("disk gone").into())
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), PersistenceError> {
            Err(std::io::Error::other("disk gone").into())
        }

        fn remove(&mut self, _key: &str) -> Result<(), PersistenceError> {
            Ok(())
        }
    }

    #[test]
    fn test_phases() {
        let mut app = test_app();
        assert_eq!(app.phase(), Phase::NoBuild);

        app.roll_now().unwrap();
        assert_eq!(app.phase(), Phase::DraftInProgress);
        assert_eq!(app.draft().classes.len(), 3);
        assert_eq!(app.draft().skills.len(), 3);

        app.select_class(1).unwrap();
        let picked = app.select_skill(2).unwrap().cloned().unwrap();
        let build = app.finalize().unwrap().clone();
        assert_eq!(app.phase(), Phase::BuildActive);
        assert_eq!(build.main_skill, picked.main);
        assert_eq!(build.unlocked(), std::slice::from_ref(&picked.main));
        assert!(!app.draft().has_results());
        assert!(app.draft().selected_class.is_none());
    }

    #[test]
    fn test_roll_is_single_flight() {
        let mut app = test_app();
        let start = Instant::now();
        app.begin_roll(start).unwrap();
        assert_eq!(app.begin_roll(start), Err(ValidationError::RollInProgress));
        assert_eq!(app.finalize().unwrap_err(), ValidationError::RollInProgress);

        assert!(!app.update(start + Duration::from_millis(599)));
        assert!(app.draft().skills.is_empty());
        assert_eq!(app.roll_remaining(start), Some(Duration::from_millis(600)));

        assert!(app.update(start + Duration::from_millis(600)));
        assert!(!app.is_rolling());
        assert_eq!(app.draft().skills.len(), 3);
        assert!(!app.update(start + Duration::from_secs(5)));
    }

    #[test]
    fn test_finalize_needs_selections() {
        let mut app = test_app();
        app.roll_now().unwrap();
        assert_eq!(app.finalize().unwrap_err(), ValidationError::MissingSelection("a class"));
        app.select_class(0).unwrap();
        assert_eq!(app.finalize().unwrap_err(), ValidationError::MissingSelection("a skill"));
        assert_eq!(app.phase(), Phase::DraftInProgress);
    }

    #[test]
    fn test_finalize_resets_checklist() {
        let mut app = test_app();
        app.toggle_checklist_item("1");
        app.add_checklist_item("Something extra").unwrap();
        with_build(&mut app);
        assert_eq!(app.ledger().items(), crate::progression::default_checklist().as_slice());
    }

    #[test]
    fn test_failed_roll_keeps_selection() {
        let mut app = test_app();
        app.roll_now().unwrap();
        app.select_skill(0).unwrap();

        app.clear_selected_tags();
        assert_eq!(app.roll_now(), Err(ValidationError::NoSkillsAvailable));
        assert!(app.draft().selected_skill.is_some());
        assert!(!app.is_rolling());
    }

    #[test]
    fn test_unlock_flow() {
        let mut app = test_app();
        with_build(&mut app);
        let main = app.build().unwrap().main_skill.name.clone();

        app.set_unlock_mode_enabled(true);
        assert!(app.is_unlock_mode());
        assert_eq!(app.roll_now(), Err(ValidationError::NoUnlockPoints));

        app.toggle_checklist_item("1");
        assert_eq!(app.available_points(), 1);

        app.set_skill_count(10);
        app.roll_now().unwrap();
        assert!(app.draft().classes.is_empty());
        assert_eq!(app.draft().skills.len(), 3);
        assert!(app.draft().skills.iter().all(|s| s.main.name != main));

        app.select_skill(0).unwrap();
        let build = app.finalize().unwrap();
        assert_eq!(build.unlocked().len(), 2);
        assert_eq!(build.main_skill.name, main);
        assert_eq!(app.available_points(), 0);
        assert_eq!(app.roll_now(), Err(ValidationError::NoUnlockPoints));
    }

    #[test]
    fn test_set_active_skill_keeps_unlocked() {
        let mut app = test_app();
        with_build(&mut app);
        app.set_unlock_mode_enabled(true);
        app.toggle_checklist_item("1");
        app.roll_now().unwrap();
        app.select_skill(0).unwrap();
        let second = app.finalize().unwrap().unlocked()[1].clone();

        app.set_active_skill(second.clone()).unwrap();
        let build = app.build().unwrap();
        assert_eq!(build.main_skill, second);
        assert_eq!(build.unlocked().len(), 2);
    }

    #[test]
    fn test_start_new_build() {
        let mut app = test_app();
        with_build(&mut app);
        app.toggle_checklist_item("2");
        app.roll_now().unwrap();

        app.start_new_build();
        assert_eq!(app.phase(), Phase::NoBuild);
        assert_eq!(app.ledger().completed_count(), 0);
        assert!(!app.draft().has_results());
    }

    #[test]
    fn test_start_new_build_drops_pending_roll() {
        let mut app = test_app();
        with_build(&mut app);
        app.set_unlock_mode_enabled(true);
        app.toggle_checklist_item("1");
        let start = Instant::now();
        app.begin_roll(start).unwrap();

        app.start_new_build();
        assert!(!app.is_rolling());
        assert!(!app.update(start + Duration::from_secs(1)));
        assert_eq!(app.phase(), Phase::NoBuild);
        assert!(app.draft().classes.is_empty());
        assert!(app.draft().skills.is_empty());

        // The next roll is a fresh new-build draft
        app.roll_now().unwrap();
        assert_eq!(app.draft().classes.len(), 3);
        app.select_class(0).unwrap();
        app.select_skill(0).unwrap();
        assert!(app.finalize().is_ok());
    }

    #[test]
    fn test_reset_to_defaults() {
        let mut app = test_app();
        with_build(&mut app);
        app.delete_tag("Spell");
        app.toggle_tag_exclusion("Attack");
        app.toggle_tag_collapse("Minion");
        app.toggle_selected_tag("Minion");

        let start = Instant::now();
        app.begin_roll(start).unwrap();

        app.reset_to_defaults();
        assert_eq!(app.catalog().skills(), test_defaults().skills.as_slice());
        assert_eq!(app.catalog().flags(), &CatalogFlags::default());
        assert!(app.all_tags_selected());
        assert!(app.build().is_none());
        assert!(!app.update(start + Duration::from_secs(1)));
        assert_eq!(app.phase(), Phase::NoBuild);
    }

    #[test]
    fn test_tag_helpers() {
        let mut app = test_app();
        assert!(app.all_tags_selected());
        app.clear_selected_tags();
        assert!(!app.all_tags_selected());

        app.toggle_tag_exclusion("Minion");
        app.select_all_tags();
        assert!(app.all_tags_selected());
        assert!(!app.settings().is_tag_selected("Minion"));
        assert!(!app.skill_pool_preview().contains_key("Minion"));
    }

    #[test]
    fn test_state_survives_reload() {
        let mut app = test_app();
        app.toggle_tag_exclusion("Minion");
        app.toggle_class_collapse("Witch");
        app.set_class_count(2);
        app.add_skill(SkillRecord::new("Blade Vortex", "Spell", "")).unwrap();
        with_build(&mut app);
        app.rename_build("Sparky").unwrap();
        app.toggle_checklist_item("3");
        app.roll_now().unwrap();
        app.select_skill(1).unwrap();

        let catalog = app.catalog().clone();
        let build = app.build().cloned();
        let ledger = app.ledger().clone();
        let settings = app.settings().clone();
        let skills = app.draft().skills.clone();
        let selected = app.draft().selected_skill.clone();

        let reloaded = AppState::load(test_defaults(), app.into_store());
        assert_eq!(reloaded.catalog(), &catalog);
        assert_eq!(reloaded.build().cloned(), build);
        assert_eq!(reloaded.ledger(), &ledger);
        assert_eq!(reloaded.settings(), &settings);
        assert_eq!(reloaded.draft().skills, skills);
        assert_eq!(reloaded.draft().selected_skill, selected);
    }

    #[test]
    fn test_corrupt_entries_fall_back() {
        let mut store = MemoryStore::new();
        store.set("skills", "][").unwrap();
        store.set("active_build", "null").unwrap();
        store.set("checklist", r#"{"nope":true}"#).unwrap();

        let app = AppState::load(test_defaults(), Box::new(store));
        assert_eq!(app.catalog().skills(), test_defaults().skills.as_slice());
        assert!(app.build().is_none());
        assert_eq!(app.ledger().total(), 8);
    }

    #[test]
    fn test_settings_without_tag_filter_select_every_tag() {
        let mut store = MemoryStore::new();
        store
            .set("generator_settings", r#"{"classCount": 2, "unlockModeEnabled": true}"#)
            .unwrap();

        let mut app = AppState::load(test_defaults(), Box::new(store)).with_seed(3);
        assert!(app.all_tags_selected());
        assert_eq!(app.settings().class_count(), 2);
        assert!(app.settings().unlock_mode_enabled());
        assert!(app.roll_now().is_ok());
    }

    #[test]
    fn test_cleared_tag_filter_survives_reload() {
        let mut app = test_app();
        app.clear_selected_tags();

        let reloaded = AppState::load(test_defaults(), app.into_store());
        assert!(reloaded.settings().selected_tags().is_empty());
    }

    #[test]
    fn test_broken_store_is_not_fatal() {
        let mut app = AppState::load(test_defaults(), Box::new(BrokenStore)).with_seed(1);
        with_build(&mut app);
        assert_eq!(app.toggle_checklist_item("1"), Some(true));
        assert_eq!(app.phase(), Phase::BuildActive);
    }

    #[test]
    fn test_share_needs_build() {
        let mut app = test_app();
        assert!(matches!(app.share_token(), Err(EncodeError::NoActiveBuild)));

        with_build(&mut app);
        app.toggle_checklist_item("1");
        let url = app.share_url("https://example.com/").unwrap();
        let preview = crate::share::SharePreview::open(&url).unwrap();
        assert_eq!(Some(preview.build()), app.build());
        assert_eq!(preview.checklist(), app.ledger().items());
    }
}
