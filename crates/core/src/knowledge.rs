//! Photography knowledge base.
//!
//! A read-only, ordered mapping from scenario key to [`StyleGuide`]. The
//! order of entries is the order they appear in the source JSON, and style
//! extraction relies on it (first keyword match wins). The knowledge base is
//! loaded once and shared; nothing mutates it after load.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Knowledge base bundled with the crate.
const BUILTIN_KNOWLEDGE_JSON: &str = include_str!("../data/photography_knowledge.json");

/// Pro tip used when a scenario's comprehensive bundle has none.
pub const DEFAULT_PRO_TIP: &str =
    "Adjust these settings based on your specific lighting conditions and creative vision.";

// ---------------------------------------------------------------------------
// Style guide
// ---------------------------------------------------------------------------

/// Guidance for one named photography look.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleGuide {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub beginner_steps: BeginnerSteps,
    #[serde(default)]
    pub comprehensive: ComprehensiveGuide,
}

impl StyleGuide {
    /// Whether any keyword is a substring of the already case-folded message.
    pub fn matches(&self, message_lower: &str) -> bool {
        self.keywords
            .iter()
            .any(|kw| !kw.is_empty() && message_lower.contains(&kw.to_lowercase()))
    }
}

/// The four walkthrough texts, nested the way the knowledge file stores them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeginnerSteps {
    #[serde(default)]
    pub step1: SceneGearOverview,
    #[serde(default)]
    pub step2: LightingSetup,
    #[serde(default)]
    pub step3: PosingComposition,
    #[serde(default)]
    pub step4: FinalProTip,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneGearOverview {
    #[serde(default)]
    pub scene_gear_overview: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightingSetup {
    #[serde(default)]
    pub lighting_setup: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PosingComposition {
    #[serde(default)]
    pub posing_composition: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalProTip {
    #[serde(default)]
    pub final_pro_tip: String,
}

impl BeginnerSteps {
    /// Stored text for a 1-based walkthrough step. Unknown steps yield `""`.
    pub fn text(&self, step: u32) -> &str {
        match step {
            1 => &self.step1.scene_gear_overview,
            2 => &self.step2.lighting_setup,
            3 => &self.step3.posing_composition,
            4 => &self.step4.final_pro_tip,
            _ => "",
        }
    }
}

/// Single-shot guidance for intermediate and advanced users.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveGuide {
    #[serde(default)]
    pub setup: String,
    #[serde(default)]
    pub gear: String,
    #[serde(default)]
    pub angles: String,
    #[serde(default)]
    pub camera_settings: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pro_tip: Option<String>,
}

impl ComprehensiveGuide {
    /// Pro tip, falling back to [`DEFAULT_PRO_TIP`] when absent or blank.
    pub fn pro_tip(&self) -> &str {
        match self.pro_tip.as_deref() {
            Some(tip) if !tip.trim().is_empty() => tip,
            _ => DEFAULT_PRO_TIP,
        }
    }
}

// ---------------------------------------------------------------------------
// Knowledge base
// ---------------------------------------------------------------------------

/// Ordered scenario key → guidance mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeBase {
    styles: IndexMap<String, StyleGuide>,
}

impl KnowledgeBase {
    /// An empty knowledge base. Every style lookup misses, so the engine
    /// only ever produces general advice.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from already-parsed entries, keeping their order.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, StyleGuide)>,
    {
        Self {
            styles: entries.into_iter().collect(),
        }
    }

    /// Parse a knowledge base from its JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let styles: IndexMap<String, StyleGuide> = serde_json::from_str(json)
            .map_err(|e| CoreError::KnowledgeBase(format!("Error decoding knowledge base: {e}")))?;
        Ok(Self { styles })
    }

    /// Read and parse a knowledge base file.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            CoreError::KnowledgeBase(format!(
                "Knowledge base not readable at {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&json)
    }

    /// Load a knowledge base file, degrading to an empty mapping on any
    /// failure. The failure is logged, never propagated.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(kb) => {
                tracing::info!(path = %path.display(), styles = kb.len(), "Knowledge base loaded");
                kb
            }
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "Knowledge base unavailable, continuing without it"
                );
                Self::empty()
            }
        }
    }

    /// The knowledge base bundled with this crate.
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_KNOWLEDGE_JSON).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Built-in knowledge base failed to parse");
            Self::empty()
        })
    }

    pub fn get(&self, key: &str) -> Option<&StyleGuide> {
        self.styles.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.styles.contains_key(key)
    }

    /// Entries in stored order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleGuide)> {
        self.styles.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// Human-readable form of a scenario key (`dark_moody_fashion` → `dark moody fashion`).
pub fn display_name(key: &str) -> String {
    key.replace('_', " ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn builtin_parses_and_is_nonempty() {
        let kb = KnowledgeBase::builtin();
        assert!(!kb.is_empty());
        assert!(kb.contains("dark_moody_fashion"));
        assert!(kb.contains("beach_golden_hour"));
    }

    #[test]
    fn builtin_entries_have_all_texts() {
        let kb = KnowledgeBase::builtin();
        for (key, guide) in kb.iter() {
            assert!(!guide.keywords.is_empty(), "{key} has no keywords");
            for step in 1..=4 {
                assert!(
                    !guide.beginner_steps.text(step).is_empty(),
                    "{key} step {step} is empty"
                );
            }
            assert!(!guide.comprehensive.setup.is_empty(), "{key} has no setup");
        }
    }

    #[test]
    fn order_follows_source_json() {
        let kb = KnowledgeBase::from_json_str(
            r#"{"zeta": {"keywords": ["z"]}, "alpha": {"keywords": ["a"]}}"#,
        )
        .unwrap();
        let keys: Vec<&str> = kb.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let kb = KnowledgeBase::from_json_str(r#"{"bare": {}}"#).unwrap();
        let guide = kb.get("bare").unwrap();
        assert!(guide.keywords.is_empty());
        assert_eq!(guide.beginner_steps.text(2), "");
        assert_eq!(guide.comprehensive.pro_tip(), DEFAULT_PRO_TIP);
    }

    #[test]
    fn step_text_out_of_range_is_empty() {
        let guide = StyleGuide::default();
        assert_eq!(guide.beginner_steps.text(0), "");
        assert_eq!(guide.beginner_steps.text(5), "");
    }

    #[test]
    fn blank_pro_tip_falls_back() {
        let guide = ComprehensiveGuide {
            pro_tip: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(guide.pro_tip(), DEFAULT_PRO_TIP);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(KnowledgeBase::from_json_str("not json").is_err());
    }

    #[test]
    fn load_or_empty_on_missing_file() {
        let kb = KnowledgeBase::load_or_empty(Path::new("/definitely/not/here.json"));
        assert!(kb.is_empty());
    }

    #[test]
    fn load_or_empty_on_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ broken").unwrap();
        let kb = KnowledgeBase::load_or_empty(file.path());
        assert!(kb.is_empty());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"studio": {{"keywords": ["studio"]}}}}"#).unwrap();
        let kb = KnowledgeBase::load(file.path()).unwrap();
        assert_eq!(kb.len(), 1);
    }

    #[test]
    fn style_guide_matches_substring_case_insensitively() {
        let guide = StyleGuide {
            keywords: vec!["Golden Hour".to_string()],
            ..Default::default()
        };
        assert!(guide.matches("beach at golden hour please"));
        assert!(!guide.matches("blue hour"));
    }

    #[test]
    fn display_name_replaces_underscores() {
        assert_eq!(display_name("dark_moody_fashion"), "dark moody fashion");
    }
}
