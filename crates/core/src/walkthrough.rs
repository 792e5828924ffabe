//! Step-progression state machine.
//!
//! Beginners walk through four fixed steps, one per turn, advancing on an
//! affirmative reply. Everyone else gets a single comprehensive response.
//! The walkthrough is a single pass: after step 4 the state resets and a new
//! style request starts over at step 1.

use serde::Serialize;

use crate::error::CoreError;
use crate::gear::{self, GearBuckets};
use crate::knowledge::{display_name, KnowledgeBase, StyleGuide};
use crate::session::{ConversationState, EngineContext, TurnResult};
use crate::special_cases;
use crate::types::StepNumber;

// ---------------------------------------------------------------------------
// Fixed texts
// ---------------------------------------------------------------------------

pub const FAREWELL: &str =
    "Got it. If anything changes, I'm here when you need me. Good luck with the shoot!";

pub const LOST_CONTEXT: &str = "I'm sorry, I lost track of our conversation. Could you please tell me what kind of shot you'd like to work on?";

pub const ALL_STEPS_COMPLETED: &str = "We've completed all the steps for your shoot! Feel free to ask about another photography style or technique.";

pub const CLOSING_NOTE: &str = "📌 These tips should give you a solid foundation, but every shoot is different. Adjust on the fly, and trust your eye. If anything changes, I've got your back.";

pub const MOBILE_FLASH_TIP: &str = "📱 **Mobile Flash Tip:** No lighting kit? Your phone's flashlight works as a small key light. Have a friend hold it off to one side at about 45 degrees, or bounce it off a white wall for softer light.";

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// Total number of walkthrough steps.
pub const TOTAL_STEPS: StepNumber = 4;

/// The four beginner walkthrough steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkthroughStep {
    SceneGear,
    Lighting,
    Posing,
    ProTip,
}

impl WalkthroughStep {
    /// Convert a 1-based step number.
    pub fn from_number(n: StepNumber) -> Result<Self, CoreError> {
        match n {
            1 => Ok(Self::SceneGear),
            2 => Ok(Self::Lighting),
            3 => Ok(Self::Posing),
            4 => Ok(Self::ProTip),
            _ => Err(CoreError::Validation(format!(
                "Invalid walkthrough step {n}. Must be between 1 and {TOTAL_STEPS}"
            ))),
        }
    }

    pub fn to_number(self) -> StepNumber {
        match self {
            Self::SceneGear => 1,
            Self::Lighting => 2,
            Self::Posing => 3,
            Self::ProTip => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::SceneGear => "Scene & Gear Overview",
            Self::Lighting => "Lighting Setup",
            Self::Posing => "Posing & Composition",
            Self::ProTip => "Final Pro Tip",
        }
    }

    /// Step that follows this one, honouring the skip-lighting flag.
    pub fn next(self, skip_lighting: bool) -> Option<Self> {
        match self {
            Self::SceneGear if skip_lighting => Some(Self::Posing),
            Self::SceneGear => Some(Self::Lighting),
            Self::Lighting => Some(Self::Posing),
            Self::Posing => Some(Self::ProTip),
            Self::ProTip => None,
        }
    }

    /// Question that closes this step's message.
    fn closing_prompt(self, skip_lighting: bool) -> String {
        match self.next(skip_lighting) {
            Some(Self::ProTip) => "Want a final pro tip before you shoot?".to_string(),
            Some(next) => format!("Ready for Step {}: {}?", next.to_number(), next.label()),
            None => CLOSING_NOTE.to_string(),
        }
    }
}

fn step_header(step: WalkthroughStep) -> String {
    format!("🟦 **Step {}: {}**", step.to_number(), step.label())
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// `NotStarted → Step1`: open a walkthrough for `scenario`.
pub fn start(
    kb: &KnowledgeBase,
    scenario: &str,
    message: &str,
    buckets: &GearBuckets,
    prior: &EngineContext,
) -> TurnResult {
    let guide = kb.get(scenario).cloned().unwrap_or_default();
    let rules = special_cases::evaluate(message, buckets);

    let step1 = gear::personalize(guide.beginner_steps.text(1), buckets);
    let step1 = rules.apply_to(&step1);

    let intake = format!(
        "**Intake Summary:** I understand you want to create a {} look. \
         Let me walk you through this step by step to help you achieve the perfect shot.",
        display_name(scenario)
    );
    let step = WalkthroughStep::SceneGear;
    let content = format!(
        "{intake}\n\n{}\n{step1}\n\n{}",
        step_header(step),
        step.closing_prompt(rules.skip_lighting)
    );

    tracing::info!(
        scenario,
        skip_lighting = rules.skip_lighting,
        "Walkthrough started"
    );

    TurnResult {
        content,
        step_number: Some(1),
        next_step: 1,
        awaiting_continuation: true,
        context: prior.start_scenario(scenario, buckets.snapshot(), rules.skip_lighting),
        message_type: None,
        metadata: None,
    }
}

/// Continuation received: emit the next step, or terminate.
pub fn advance(kb: &KnowledgeBase, state: &ConversationState) -> TurnResult {
    let context = &state.conversation_context;
    let Some(guide) = context.scenario().and_then(|key| kb.get(key)) else {
        tracing::warn!(
            scenario = ?context.current_scenario,
            step = state.current_step,
            "Continuation without a resolvable scenario"
        );
        return lost_context();
    };

    let next = WalkthroughStep::from_number(state.current_step)
        .ok()
        .and_then(|current| current.next(context.skip_lighting));
    let Some(next) = next else {
        return TurnResult::reset(ALL_STEPS_COMPLETED, Some(0));
    };

    tracing::info!(
        scenario = ?context.current_scenario,
        from = state.current_step,
        to = next.to_number(),
        "Walkthrough advanced"
    );
    render_step(guide, next, context)
}

fn render_step(guide: &StyleGuide, step: WalkthroughStep, context: &EngineContext) -> TurnResult {
    let mut text = guide.beginner_steps.text(step.to_number()).to_string();
    if step == WalkthroughStep::Lighting && !snapshot_has_lighting(context) {
        text.push_str("\n\n");
        text.push_str(MOBILE_FLASH_TIP);
    }

    let content = format!(
        "{}\n{text}\n\n{}",
        step_header(step),
        step.closing_prompt(context.skip_lighting)
    );

    if step == WalkthroughStep::ProTip {
        return TurnResult::reset(content, Some(step.to_number()));
    }

    TurnResult {
        content,
        step_number: Some(step.to_number()),
        next_step: step.to_number(),
        awaiting_continuation: true,
        context: context.clone(),
        message_type: None,
        metadata: None,
    }
}

fn snapshot_has_lighting(context: &EngineContext) -> bool {
    context
        .matched_gear
        .as_ref()
        .is_some_and(|gear| !gear.lighting.is_empty())
}

/// Decline at any step: same farewell, full reset.
pub fn decline() -> TurnResult {
    tracing::info!("Walkthrough declined");
    TurnResult::reset(FAREWELL, Some(0))
}

/// Stored scenario could not be resolved.
pub fn lost_context() -> TurnResult {
    TurnResult::reset(LOST_CONTEXT, Some(0))
}

// ---------------------------------------------------------------------------
// Comprehensive response
// ---------------------------------------------------------------------------

/// Single-shot response for intermediate and advanced users.
pub fn comprehensive(
    kb: &KnowledgeBase,
    scenario: &str,
    message: &str,
    buckets: &GearBuckets,
    prior: &EngineContext,
) -> TurnResult {
    let guide = kb.get(scenario).cloned().unwrap_or_default();
    let bundle = &guide.comprehensive;
    let rules = special_cases::evaluate(message, buckets);

    let mut content = format!(
        "**Setup:** {}\n\n**Recommended Gear from Your Collection:** {}",
        bundle.setup,
        gear::personalize(&bundle.gear, buckets)
    );
    if let Some(picks) = best_picks_line(buckets, scenario) {
        content.push_str("\n\n");
        content.push_str(&picks);
    }
    content.push_str(&format!(
        "\n\n**Angles & Composition:** {}\n\n**Camera Settings:** {}\n\n**Pro Tip:** {}",
        bundle.angles,
        bundle.camera_settings,
        bundle.pro_tip()
    ));
    let content = rules.apply_to(&content);

    tracing::info!(scenario, "Comprehensive response composed");

    TurnResult {
        content,
        step_number: None,
        next_step: 0,
        awaiting_continuation: false,
        context: prior.start_scenario(scenario, buckets.snapshot(), false),
        message_type: None,
        metadata: None,
    }
}

/// "Best Picks" line naming the strongest camera and lens for the scenario.
pub fn best_picks_line(buckets: &GearBuckets, scenario: &str) -> Option<String> {
    let camera = gear::best_camera(buckets, scenario);
    let lens = gear::best_lens(buckets, scenario);
    match (camera, lens) {
        (Some(camera), Some(lens)) => Some(format!(
            "**Best Picks:** Lead with your {} and {}.",
            camera.display_name(),
            lens.display_name()
        )),
        (Some(camera), None) => Some(format!(
            "**Best Picks:** Lead with your {}.",
            camera.display_name()
        )),
        (None, Some(lens)) => Some(format!(
            "**Best Picks:** Lead with your {}.",
            lens.display_name()
        )),
        (None, None) => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
