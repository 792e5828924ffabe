//! General-advice replies for messages that resolve to no scenario.
//!
//! The reply is drawn at random from a fixed set. The random source is
//! injected (and seedable) so tests can pin the selection.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::intent::IntentCategory;
use crate::session::{ConversationState, TurnResult};
use crate::types::SkillLevel;

pub const GENERAL_RESPONSES: &[&str] = &[
    "I'm Synthia, your photography shoot planning assistant! I can help you plan creative setups based on your gear and goals. Try asking me about specific looks like 'dark and moody fashion portrait' or 'high-key glamour shot'.",
    "What kind of photography look are you trying to achieve? I can provide detailed guidance for Fashion, Portrait, Sports, Glamour, Boudoir, and Headshot photography.",
    "Tell me about the vibe or style you're going for, and I'll help you plan the perfect setup using your equipment!",
];

pub const TECHNICAL_RESPONSES: &[&str] = &[
    "Happy to help with the technical side! Settings depend a lot on the look you're after. Tell me the style you're planning (for example 'beach golden hour' or 'corporate headshot') and I'll tailor aperture, shutter and ISO to your gear.",
    "Good question. The right exposure starts with the scene: describe the shoot you have in mind and I'll suggest camera settings and lens choices from your kit.",
    "I can break down lighting, lenses and exposure for you. What are you shooting? A specific look like 'dark moody fashion' or 'milky way astrophotography' gets you the most precise advice.",
];

// ---------------------------------------------------------------------------
// Picker
// ---------------------------------------------------------------------------

/// Random reply selector with an injectable seed.
#[derive(Debug)]
pub struct AdvicePicker {
    rng: Mutex<StdRng>,
}

impl AdvicePicker {
    /// Picker seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic picker.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Index into a set of `len` options. `len` must be non-zero.
    pub fn pick_index(&self, len: usize) -> usize {
        // A poisoned lock still holds a usable RNG.
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random_range(0..len)
    }

    pub fn pick<'a>(&self, options: &[&'a str]) -> &'a str {
        if options.is_empty() {
            return "";
        }
        options[self.pick_index(options.len())]
    }
}

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// Reply set for an intent.
pub fn responses_for(intent: IntentCategory) -> &'static [&'static str] {
    match intent {
        IntentCategory::TechnicalQuestion => TECHNICAL_RESPONSES,
        IntentCategory::StyleRequest | IntentCategory::GeneralAdvice => GENERAL_RESPONSES,
    }
}

/// General advice turn. An active scenario context is carried forward
/// untouched; otherwise the state is reset.
pub fn general_response(
    picker: &AdvicePicker,
    intent: IntentCategory,
    specialization: Option<&str>,
    skill_level: SkillLevel,
    state: &ConversationState,
) -> TurnResult {
    let mut content = picker.pick(responses_for(intent)).to_string();

    if let Some(spec) = specialization.map(str::trim).filter(|s| !s.is_empty()) {
        content.push_str(&format!(
            "\n\nSince you focus on {spec} photography, tell me the look you want for your next {spec} shoot and I'll plan it around your gear."
        ));
    }

    if state.conversation_context.scenario().is_some() {
        TurnResult::preserving(content, state, skill_level)
    } else {
        TurnResult::reset(content, None)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
