//! Follow-up drill-downs on an active scenario.
//!
//! A follow-up asks about one facet of the look already being discussed.
//! The reply is a focused slice of the scenario's guidance; step and context
//! are left exactly as they were.

use crate::gear::{self, GearBuckets};
use crate::intent::FollowupTopic;
use crate::knowledge::{display_name, StyleGuide};
use crate::session::{walkthrough_active, ConversationState, TurnResult};
use crate::types::SkillLevel;
use crate::walkthrough::{self, MOBILE_FLASH_TIP};

/// Substituted when the knowledge base has nothing for the requested facet.
pub const NO_NOTES: &str = "I don't have specific notes on that for this look yet.";

const GENERIC_POSING_TIPS: &[&str] = &[
    "Angle the body 30-45 degrees away from the camera; it slims and adds shape.",
    "Give hands something to do: pockets, hair, a jacket lapel.",
    "Push the chin slightly forward and down to define the jawline.",
    "Shift weight onto the back foot for a relaxed stance.",
];

/// Posing tips per scenario. Scenarios without an entry use the generic list.
pub fn posing_tips(scenario: &str) -> &'static [&'static str] {
    match scenario {
        "dark_moody_fashion" => &[
            "Turn the body away from the light and bring the face back toward it.",
            "Use strong angular shapes: elbows out, hips shifted, chin down.",
            "Keep the expression serious; mood lives in the eyes.",
        ],
        "high_key_glamour" => &[
            "Keep poses soft and open with shoulders angled to camera.",
            "Bring relaxed hands near the face and avoid showing palms.",
            "Chin forward and slightly down; eyes to the lens.",
        ],
        "boudoir" => &[
            "Arch the back gently and point the toes to lengthen lines.",
            "Shoot from slightly above for reclining poses.",
            "Talk through every pose; comfort shows on camera.",
        ],
        "corporate_headshot" => &[
            "Shoulders 30 degrees off-axis, face turned back to the lens.",
            "Lean the forehead toward camera a touch to define the jaw.",
            "Prompt micro-smiles rather than posed grins.",
        ],
        "sports_action" => &[
            "Direct warm-up moves you can repeat: sprints, jumps, follow-throughs.",
            "Capture peak action at the top of a jump or the moment of contact.",
            "Ask for intense expressions during staged action shots.",
        ],
        "group_event" => &[
            "Stagger rows and stand the tallest people at the back.",
            "Have everyone lean in toward the centre so no one is hidden.",
            "Count down out loud and shoot a burst on three.",
        ],
        "beach_golden_hour" => &[
            "Walk toward the camera or along the waterline for natural movement.",
            "Let the wind move hair and fabric; face into the breeze.",
            "Look toward the water for candid profile shots against the glow.",
        ],
        "natural_light_portrait" => &[
            "Turn the face toward the window until catchlights appear in both eyes.",
            "Rest a hand lightly near the face for a relaxed frame.",
            "Shift weight to the back foot and drop the front shoulder.",
        ],
        _ => GENERIC_POSING_TIPS,
    }
}

/// Render the drill-down for `topic` on `scenario`.
pub fn respond(
    guide: &StyleGuide,
    scenario: &str,
    topic: FollowupTopic,
    buckets: &GearBuckets,
    skill_level: SkillLevel,
    state: &ConversationState,
) -> TurnResult {
    let name = display_name(scenario);
    let bundle = &guide.comprehensive;

    let mut content = match topic {
        FollowupTopic::Posing => {
            let tips: Vec<String> = posing_tips(scenario)
                .iter()
                .map(|tip| format!("• {tip}"))
                .collect();
            format!("**Posing Tips for {name}:**\n{}", tips.join("\n"))
        }
        FollowupTopic::Lighting => {
            let mut text = format!("**Lighting for {name}:** {}", or_default(&bundle.setup));
            if !buckets.has_lighting() {
                text.push_str("\n\n");
                text.push_str(MOBILE_FLASH_TIP);
            }
            text
        }
        FollowupTopic::Gear => {
            let mut text = format!(
                "**Gear from Your Collection:** {}",
                or_default(&gear::personalize(&bundle.gear, buckets))
            );
            if let Some(picks) = walkthrough::best_picks_line(buckets, scenario) {
                text.push_str("\n\n");
                text.push_str(&picks);
            }
            text
        }
        FollowupTopic::Settings => {
            format!("**Camera Settings:** {}", or_default(&bundle.camera_settings))
        }
        FollowupTopic::Composition => {
            format!("**Angles & Composition:** {}", or_default(&bundle.angles))
        }
        FollowupTopic::Other => format!(
            "Here's a quick recap of the {name} look:\n\n**Setup:** {}\n\n\
             Ask me about posing, lighting, gear, settings, or composition for more detail.",
            or_default(&bundle.setup)
        ),
    };

    if walkthrough_active(state, skill_level) {
        content.push_str("\n\nSay **yes** whenever you're ready to pick the walkthrough back up.");
    }

    tracing::debug!(scenario, topic = ?topic, "Follow-up answered");
    TurnResult::preserving(content, state, skill_level)
}

fn or_default(text: &str) -> &str {
    if text.trim().is_empty() {
        NO_NOTES
    } else {
        text
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
