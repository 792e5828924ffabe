//! Special-case rule triggers.
//!
//! Each rule is a stateless predicate over the case-folded message and the
//! user's gear. All rules run on every evaluation; their advisories stack in
//! table order. A rule may also raise a flag consumed by the walkthrough
//! (currently only "skip the lighting step").

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::gear::GearBuckets;

// ---------------------------------------------------------------------------
// Advisory texts
// ---------------------------------------------------------------------------

pub const ASTRO_NOTE: &str = "**Note:** Since this is astrophotography, we'll focus on exposure, tripod use, and mobile workflow rather than artificial lighting.";

pub const INFRARED_590_NOTE: &str = "**Infrared Note:** 590nm creates Aerochrome-style looks with red/gold foliage. Consider custom white balance and channel swapping in post.";

pub const INFRARED_720_NOTE: &str = "**Infrared Note:** 720nm produces the traditional IR look with white foliage and dark skies.";

pub const DRONE_DISCLAIMER: &str = "⚠️ **Drone Disclaimer:** FAA rules regarding drone registration, Remote ID, and airspace limits vary by location. Users should consult faa.gov/uas or the B4UFLY app before flying.";

pub const UNDERWATER_NOTE: &str = "**Underwater Note:** Use a housing rated for your depth and check the seals before every dive. Water filters out red light quickly, so set a custom white balance at shooting depth.";

pub const UNDERWATER_NO_STROBE_NOTE: &str = "Without underwater strobes, stay within 3-5 m of the surface and shoot with the sun behind you to keep colours alive.";

const ASTRO_KEYWORDS: &[&str] = &["astrophotography", "stars", "milky way", "night sky"];
const DRONE_KEYWORDS: &[&str] = &["drone", "aerial", "flying"];
const UNDERWATER_KEYWORDS: &[&str] = &["underwater", "under water", "snorkel", "scuba"];

/// "group of 8", "party of 12", "10 people".
static GROUP_SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\b(?:group|party|family|team)\s+of\s+(\d+)\b",
        r"|\b(\d+)\s+(?:people|persons|guests|friends|members|kids|adults)\b",
    ))
    .expect("valid regex")
});

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// What a rule looks at.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    /// Message, already case-folded.
    pub message: &'a str,
    pub gear: &'a GearBuckets,
}

/// What a triggered rule contributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleEffect {
    pub advisory: Option<String>,
    pub skip_lighting: bool,
}

impl RuleEffect {
    fn advisory(text: impl Into<String>) -> Self {
        Self {
            advisory: Some(text.into()),
            skip_lighting: false,
        }
    }
}

/// A named predicate → effect rule. `None` means the rule did not fire.
pub struct SpecialCaseRule {
    pub name: &'static str,
    pub evaluate: fn(&RuleInput<'_>) -> Option<RuleEffect>,
}

/// All rules, in concatenation order.
pub const RULES: &[SpecialCaseRule] = &[
    SpecialCaseRule {
        name: "astrophotography",
        evaluate: astrophotography,
    },
    SpecialCaseRule {
        name: "infrared_590nm",
        evaluate: infrared_590,
    },
    SpecialCaseRule {
        name: "infrared_720nm",
        evaluate: infrared_720,
    },
    SpecialCaseRule {
        name: "drone",
        evaluate: drone,
    },
    SpecialCaseRule {
        name: "group",
        evaluate: group,
    },
    SpecialCaseRule {
        name: "underwater",
        evaluate: underwater,
    },
];

fn contains_any(message: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| message.contains(kw))
}

fn astrophotography(input: &RuleInput<'_>) -> Option<RuleEffect> {
    if !contains_any(input.message, ASTRO_KEYWORDS) || input.gear.has_lighting() {
        return None;
    }
    Some(RuleEffect {
        advisory: Some(ASTRO_NOTE.to_string()),
        skip_lighting: true,
    })
}

fn infrared_590(input: &RuleInput<'_>) -> Option<RuleEffect> {
    contains_any(input.message, &["590nm", "590 nm"])
        .then(|| RuleEffect::advisory(INFRARED_590_NOTE))
}

fn infrared_720(input: &RuleInput<'_>) -> Option<RuleEffect> {
    contains_any(input.message, &["720nm", "720 nm"])
        .then(|| RuleEffect::advisory(INFRARED_720_NOTE))
}

fn drone(input: &RuleInput<'_>) -> Option<RuleEffect> {
    contains_any(input.message, DRONE_KEYWORDS).then(|| RuleEffect::advisory(DRONE_DISCLAIMER))
}

fn group(input: &RuleInput<'_>) -> Option<RuleEffect> {
    let size = parse_group_size(input.message);
    if !input.message.contains("group") && size.is_none() {
        return None;
    }
    Some(RuleEffect::advisory(group_tip(size)))
}

fn underwater(input: &RuleInput<'_>) -> Option<RuleEffect> {
    if !contains_any(input.message, UNDERWATER_KEYWORDS) {
        return None;
    }
    let text = if input.gear.has_lighting() {
        UNDERWATER_NOTE.to_string()
    } else {
        format!("{UNDERWATER_NOTE} {UNDERWATER_NO_STROBE_NOTE}")
    };
    Some(RuleEffect::advisory(text))
}

/// Group size mentioned in the message, if any.
///
/// Zero and counts that overflow `u32` are treated as no size at all.
pub fn parse_group_size(message: &str) -> Option<u32> {
    let caps = GROUP_SIZE_RE.captures(message)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|&n| n > 0)
}

/// Framing advice scaled to the number of people.
pub fn group_tip(size: Option<u32>) -> String {
    match size {
        Some(n) if n < 3 => format!(
            "**Group Photography Tip:** With {n} people, f/2.8 works as long as both faces sit on the same plane. Have them lean in so their eyes line up."
        ),
        Some(n) if n <= 5 => format!(
            "**Group Photography Tip:** For a group of {n}, use f/4 or f/5.6 instead of f/2.8 to keep every face sharp, especially if people are on different planes."
        ),
        Some(n) if n <= 15 => format!(
            "**Group Photography Tip:** For a group of {n}, stop down to f/5.6-f/8, arrange staggered rows, and raise the camera slightly so the back row's faces are visible."
        ),
        Some(n) => format!(
            "**Group Photography Tip:** For a group of {n}, shoot at f/8-f/11 from an elevated position (ladder or balcony), focus one-third into the group, and step back rather than going wider to avoid stretched faces at the edges."
        ),
        None => "**Group Photography Tip:** When photographing groups of 3 or more, consider using f/4 or f/5.6 instead of f/2.8 to keep multiple faces sharp, especially if people are on different planes.".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Combined result of running every rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpecialCaseOutcome {
    pub advisories: Vec<String>,
    pub skip_lighting: bool,
    /// Names of the rules that fired, in table order.
    pub triggered: Vec<&'static str>,
}

impl SpecialCaseOutcome {
    /// Append every advisory to `content`, each as its own paragraph.
    pub fn apply_to(&self, content: &str) -> String {
        let mut out = content.to_string();
        for advisory in &self.advisories {
            out.push_str("\n\n");
            out.push_str(advisory);
        }
        out
    }
}

/// Run every rule against `message` and `gear`.
pub fn evaluate(message: &str, gear: &GearBuckets) -> SpecialCaseOutcome {
    let lower = message.to_lowercase();
    let input = RuleInput {
        message: &lower,
        gear,
    };

    let mut outcome = SpecialCaseOutcome::default();
    for rule in RULES {
        if let Some(effect) = (rule.evaluate)(&input) {
            outcome.triggered.push(rule.name);
            outcome.skip_lighting |= effect.skip_lighting;
            if let Some(advisory) = effect.advisory {
                outcome.advisories.push(advisory);
            }
        }
    }

    if !outcome.triggered.is_empty() {
        tracing::debug!(
            rules = ?outcome.triggered,
            skip_lighting = outcome.skip_lighting,
            "Special-case rules fired"
        );
    }
    outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gear::{bucket, GearCategory, GearItem};

    fn with_lighting() -> GearBuckets {
        bucket(&[GearItem::new(GearCategory::Lighting, "Godox", "AD200")])
    }

    #[test]
    fn no_rules_fire_on_plain_message() {
        let outcome = evaluate("studio portrait", &GearBuckets::default());
        assert!(outcome.advisories.is_empty());
        assert!(!outcome.skip_lighting);
        assert!(outcome.triggered.is_empty());
    }

    #[test]
    fn astro_without_lighting_sets_skip_flag() {
        let outcome = evaluate("Milky Way over the lake", &GearBuckets::default());
        assert!(outcome.skip_lighting);
        assert_eq!(outcome.advisories, vec![ASTRO_NOTE.to_string()]);
    }

    #[test]
    fn astro_with_lighting_does_not_skip() {
        let outcome = evaluate("night sky with stars", &with_lighting());
        assert!(!outcome.skip_lighting);
        assert!(outcome.advisories.is_empty());
    }

    #[test]
    fn infrared_variants_are_independent() {
        let outcome = evaluate("590nm infrared vs 720 nm infrared", &GearBuckets::default());
        assert_eq!(outcome.triggered, vec!["infrared_590nm", "infrared_720nm"]);
    }

    #[test]
    fn drone_disclaimer() {
        let outcome = evaluate("aerial shots of the coast", &GearBuckets::default());
        assert_eq!(outcome.advisories, vec![DRONE_DISCLAIMER.to_string()]);
    }

    #[test]
    fn advisories_stack_in_table_order() {
        let outcome = evaluate(
            "drone shot of stars over a group of 4 friends",
            &GearBuckets::default(),
        );
        assert_eq!(outcome.triggered, vec!["astrophotography", "drone", "group"]);
        assert!(outcome.skip_lighting);
        let text = outcome.apply_to("base");
        let astro = text.find("astrophotography").unwrap();
        let drone = text.find("Drone Disclaimer").unwrap();
        let group = text.find("Group Photography Tip").unwrap();
        assert!(astro < drone && drone < group);
        assert!(text.starts_with("base\n\n"));
    }

    #[test]
    fn group_size_parsing() {
        assert_eq!(parse_group_size("a group of 8 at the park"), Some(8));
        assert_eq!(parse_group_size("12 people on stairs"), Some(12));
        assert_eq!(parse_group_size("a group shot"), None);
    }

    #[test]
    fn group_size_keeps_every_digit() {
        assert_eq!(parse_group_size("1000 people"), Some(1000));
        assert_eq!(parse_group_size("group of 1000"), Some(1000));
    }

    #[test]
    fn group_size_rejects_zero_and_overflow() {
        assert_eq!(parse_group_size("0 people"), None);
        assert_eq!(parse_group_size("group of 99999999999"), None);
    }

    #[test]
    fn large_event_gets_large_group_tip() {
        let outcome = evaluate("event shoot with 1000 people", &GearBuckets::default());
        assert_eq!(outcome.triggered, vec!["group"]);
        assert!(outcome.advisories[0].contains("group of 1000"));
        assert!(outcome.advisories[0].contains("f/8-f/11"));
    }

    #[test]
    fn group_tip_scales_with_size() {
        assert!(group_tip(Some(2)).contains("f/2.8"));
        assert!(group_tip(Some(4)).contains("f/4 or f/5.6"));
        assert!(group_tip(Some(10)).contains("staggered rows"));
        assert!(group_tip(Some(40)).contains("f/8-f/11"));
        assert!(group_tip(None).contains("groups of 3 or more"));
    }

    #[test]
    fn group_rule_fires_on_size_without_group_word() {
        let outcome = evaluate("20 guests at a garden party", &GearBuckets::default());
        assert_eq!(outcome.triggered, vec!["group"]);
        assert!(outcome.advisories[0].contains("group of 20"));
    }

    #[test]
    fn underwater_mentions_strobes_when_missing() {
        let without = evaluate("underwater reef shoot", &GearBuckets::default());
        assert!(without.advisories[0].contains(UNDERWATER_NO_STROBE_NOTE));
        let with = evaluate("underwater reef shoot", &with_lighting());
        assert_eq!(with.advisories, vec![UNDERWATER_NOTE.to_string()]);
    }
}
