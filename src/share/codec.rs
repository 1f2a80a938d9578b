//! Share token codec
//!
//! Token = base64(percent-encode(JSON)). Percent-encoding first keeps the
//! base64 input plain ASCII whatever text the build carries.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::build::ActiveBuild;
use crate::error::{DecodeError, EncodeError};
use crate::progression::ChecklistItem;

/// Everything a share link carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareSnapshot {
    pub build: ActiveBuild,
    pub checklist: Vec<ChecklistItem>,
}

impl ShareSnapshot {
    pub fn new(build: ActiveBuild, checklist: Vec<ChecklistItem>) -> Self {
        Self { build, checklist }
    }
}

/// Pack a snapshot into a URL-safe token
pub fn encode(snapshot: &ShareSnapshot) -> Result<String, EncodeError> {
    let json = serde_json::to_string(snapshot)?;
    let escaped = urlencoding::encode(&json);
    Ok(BASE64.encode(escaped.as_bytes()))
}

/// Unpack a token produced by [`encode`]
pub fn decode(token: &str) -> Result<ShareSnapshot, DecodeError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(DecodeError::MissingData);
    }
    // Form-style query parsing turns '+' into a space
    let token = token.replace(' ', "+");

    let bytes = BASE64
        .decode(token.as_bytes())
        .map_err(|e| DecodeError::Malformed(e.to_string()))?;
    let escaped = String::from_utf8(bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    let json = urlencoding::decode(&escaped).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    let value: serde_json::Value =
        serde_json::from_str(&json).map_err(|e| DecodeError::Malformed(e.to_string()))?;

    let present = |field: &str| value.get(field).is_some_and(|v| !v.is_null());
    if !present("build") || !present("checklist") {
        return Err(DecodeError::Incomplete);
    }

    serde_json::from_value(value).map_err(|e| {
        log::warn!("Shared snapshot has an unexpected shape: {}", e);
        DecodeError::Incomplete
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use crate::build::PobLink;
    use crate::catalog::{ClassRecord, SkillRecord};
    use crate::draft::SkillPick;

    fn sample_snapshot() -> ShareSnapshot {
        let mut build = ActiveBuild::new(
            ClassRecord::new("Templar", "Hierophant"),
            SkillPick::new(SkillRecord::new("Arc", "Spell", "https://www.poewiki.net/wiki/Arc")),
            1_718_000_000_000,
        );
        build.rename("Überladung ⚡ 電撃");
        build.unlocked_skills.push(SkillRecord::new("Spark", "Spell", "#"));
        build.pob_links.push(PobLink {
            id: "l1".to_string(),
            name: "Path of Building".to_string(),
            url: "https://pobb.in/abc?x=1&y=2".to_string(),
        });
        let mut checklist = crate::progression::default_checklist();
        checklist[0].is_completed = true;
        checklist.push(ChecklistItem::new("x", "Tuer l'Uber Élder 🐙"));
        ShareSnapshot::new(build, checklist)
    }

    #[test]
    fn test_round_trip_with_unicode() {
        let snapshot = sample_snapshot();
        let token = encode(&snapshot).unwrap();
        assert!(token.is_ascii());
        assert_eq!(decode(&token).unwrap(), snapshot);
    }

    #[test]
    fn test_round_trip_empty_lists() {
        let mut snapshot = sample_snapshot();
        snapshot.checklist.clear();
        snapshot.build.pob_links.clear();
        snapshot.build.name = None;
        snapshot.build.selected_class = None;
        assert_eq!(decode(&encode(&snapshot).unwrap()).unwrap(), snapshot);
    }

    #[test]
    fn test_plus_turned_into_space_still_decodes() {
        let snapshot = sample_snapshot();
        let token = encode(&snapshot).unwrap();
        let mangled = token.replace('+', " ");
        assert_eq!(decode(&mangled).unwrap(), snapshot);
    }

    #[test]
    fn test_missing_token() {
        assert_eq!(decode(""), Err(DecodeError::MissingData));
        assert_eq!(decode("   "), Err(DecodeError::MissingData));
    }

    #[test]
    fn test_malformed_token() {
        assert!(matches!(decode("!!not base64!!"), Err(DecodeError::Malformed(_))));
        // Valid base64, not JSON
        let token = BASE64.encode("hello");
        assert!(matches!(decode(&token), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_incomplete_snapshot() {
        let only_checklist = BASE64.encode(urlencoding::encode(r#"{"checklist":[]}"#).as_bytes());
        assert_eq!(decode(&only_checklist), Err(DecodeError::Incomplete));

        let null_build = BASE64.encode(urlencoding::encode(r#"{"build":null,"checklist":[]}"#).as_bytes());
        assert_eq!(decode(&null_build), Err(DecodeError::Incomplete));

        let bad_build = BASE64.encode(urlencoding::encode(r#"{"build":{"x":1},"checklist":[]}"#).as_bytes());
        assert_eq!(decode(&bad_build), Err(DecodeError::Incomplete));
    }

    #[test]
    fn test_decodes_legacy_build_fields() {
        // Older builds carry neither unlockedSkills nor pobLinks
        let json = r##"{"build":{"mainSkill":{"name":"Arc","tag":"Spell","url":"#"},"supportSkills":[],"timestamp":1},"checklist":[{"id":"1","text":"Act 10","isCompleted":true}]}"##;
        let token = BASE64.encode(urlencoding::encode(json).as_bytes());
        let snapshot = decode(&token).unwrap();
        assert_eq!(snapshot.build.unlocked().len(), 1);
        assert!(snapshot.build.pob_links.is_empty());
        assert!(snapshot.checklist[0].is_completed);
    }

    fn arb_skill() -> impl Strategy<Value = SkillRecord> {
        ("\\PC{0,24}", "\\PC{0,12}", "\\PC{0,40}", proptest::option::of("\\PC{0,12}")).prop_map(
            |(name, tag, url, attribute)| SkillRecord { name, tag, url, attribute },
        )
    }

    fn arb_snapshot() -> impl Strategy<Value = ShareSnapshot> {
        (
            proptest::option::of("\\PC{0,64}"),
            proptest::option::of(("\\PC{0,16}", "\\PC{0,16}")),
            arb_skill(),
            prop::collection::vec(arb_skill(), 0..4),
            prop::collection::vec(("[a-z0-9]{9}", "\\PC{0,20}", "\\PC{0,60}"), 0..4),
            any::<u64>(),
            prop::collection::vec(("[a-z0-9]{1,9}", "\\PC{0,80}", any::<bool>()), 0..10),
        )
            .prop_map(|(name, class, main, extra, links, timestamp, items)| {
                let mut unlocked = vec![main.clone()];
                unlocked.extend(extra);
                ShareSnapshot {
                    build: ActiveBuild {
                        name,
                        selected_class: class.map(|(c, a)| ClassRecord::new(c, a)),
                        main_skill: main,
                        support_skills: Vec::new(),
                        unlocked_skills: unlocked,
                        pob_links: links
                            .into_iter()
                            .map(|(id, name, url)| PobLink { id, name, url })
                            .collect(),
                        timestamp,
                    },
                    checklist: items
                        .into_iter()
                        .map(|(id, text, is_completed)| ChecklistItem { id, text, is_completed })
                        .collect(),
                }
            })
    }

    proptest! {
        #[test]
        fn prop_round_trip(snapshot in arb_snapshot()) {
            let token = encode(&snapshot).unwrap();
            prop_assert_eq!(decode(&token).unwrap(), snapshot);
        }
    }
}
