//! Keyword classifiers for incoming messages.
//!
//! Every classifier here is a plain ordered table scanned first-match. No
//! scoring, no state: the same message always classifies the same way.

use serde::Serialize;

use crate::knowledge::KnowledgeBase;

// ---------------------------------------------------------------------------
// Keyword tables
// ---------------------------------------------------------------------------

const STYLE_KEYWORDS: &[&str] = &[
    "portrait", "fashion", "glamour", "boudoir", "headshot", "sports", "moody", "high-key",
    "low-key", "dramatic", "soft", "natural",
];

const TECHNICAL_KEYWORDS: &[&str] = &[
    "settings", "camera", "lens", "lighting", "exposure", "aperture", "iso",
];

/// Exact (trimmed, case-folded) affirmative replies.
pub const CONTINUATION_TOKENS: &[&str] = &[
    "yes", "y", "continue", "next", "proceed", "go ahead", "sure", "ok", "okay",
];

/// Exact (trimmed, case-folded) negative replies.
pub const DECLINE_TOKENS: &[&str] = &[
    "no", "n", "stop", "enough", "good", "i'm good", "thanks", "thank you",
];

const POSING_KEYWORDS: &[&str] = &["pose", "posing", "poses", "expression", "hands", "stance"];

const LIGHTING_KEYWORDS: &[&str] = &[
    "lighting", "light", "flash", "strobe", "softbox", "reflector", "shadow",
];

const GEAR_KEYWORDS: &[&str] = &[
    "gear", "equipment", "which lens", "what lens", "which camera", "kit",
];

const SETTINGS_KEYWORDS: &[&str] = &[
    "settings", "setting", "aperture", "shutter", "iso", "exposure", "f-stop", "white balance",
];

const COMPOSITION_KEYWORDS: &[&str] = &[
    "composition", "compose", "framing", "frame", "angle", "angles", "crop",
];

const HELP_PHRASES: &[&str] = &[
    "tell me more", "more about", "what about", "how do i", "how should i", "any tips",
    "explain", "elaborate",
];

/// Follow-up families in dispatch priority order.
const FOLLOWUP_TABLE: &[(FollowupTopic, &[&str])] = &[
    (FollowupTopic::Posing, POSING_KEYWORDS),
    (FollowupTopic::Lighting, LIGHTING_KEYWORDS),
    (FollowupTopic::Gear, GEAR_KEYWORDS),
    (FollowupTopic::Settings, SETTINGS_KEYWORDS),
    (FollowupTopic::Composition, COMPOSITION_KEYWORDS),
    (FollowupTopic::Other, HELP_PHRASES),
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Coarse intent of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    StyleRequest,
    TechnicalQuestion,
    GeneralAdvice,
}

/// Facet of an active scenario a follow-up asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowupTopic {
    Posing,
    Lighting,
    Gear,
    Settings,
    Composition,
    Other,
}

// ---------------------------------------------------------------------------
// Classifiers
// ---------------------------------------------------------------------------

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|kw| haystack.contains(kw))
}

fn normalized(message: &str) -> String {
    message.trim().to_lowercase()
}

/// Classify a message; style keywords are checked before technical ones.
pub fn classify(message: &str) -> IntentCategory {
    let lower = message.to_lowercase();
    if contains_any(&lower, STYLE_KEYWORDS) {
        IntentCategory::StyleRequest
    } else if contains_any(&lower, TECHNICAL_KEYWORDS) {
        IntentCategory::TechnicalQuestion
    } else {
        IntentCategory::GeneralAdvice
    }
}

/// `true` iff the whole message is an affirmative token.
pub fn is_continuation(message: &str) -> bool {
    CONTINUATION_TOKENS.contains(&normalized(message).as_str())
}

/// `true` iff the whole message is a negative token.
pub fn is_decline(message: &str) -> bool {
    DECLINE_TOKENS.contains(&normalized(message).as_str())
}

/// Whether the message asks about a facet of the active scenario.
pub fn is_followup(message: &str) -> bool {
    followup_match(message).is_some()
}

/// Topic of a follow-up, by family priority. Messages that match no family
/// map to [`FollowupTopic::Other`].
pub fn followup_topic(message: &str) -> FollowupTopic {
    followup_match(message).unwrap_or(FollowupTopic::Other)
}

fn followup_match(message: &str) -> Option<FollowupTopic> {
    let lower = message.to_lowercase();
    FOLLOWUP_TABLE
        .iter()
        .find(|(_, keywords)| contains_any(&lower, keywords))
        .map(|(topic, _)| *topic)
}

/// First knowledge-base scenario (in stored order) with a keyword in the message.
pub fn extract_style<'kb>(message: &str, kb: &'kb KnowledgeBase) -> Option<&'kb str> {
    let lower = message.to_lowercase();
    kb.iter()
        .find(|(_, guide)| guide.matches(&lower))
        .map(|(key, _)| key)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
