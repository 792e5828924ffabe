//! Conversation state carried between turns and the per-turn result.
//!
//! The caller owns persistence. It hands the engine a [`ConversationState`],
//! and replaces its stored step and context with the `next_step` and
//! `context` of the returned [`TurnResult`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::gear::GearSnapshot;
use crate::types::{SkillLevel, StepNumber};

// ---------------------------------------------------------------------------
// Engine context
// ---------------------------------------------------------------------------

/// Scenario context stored in the session between turns.
///
/// Persisted as `{current_scenario?, matched_gear?, skip_lighting?, ...}`.
/// Unrecognised keys land in `extra` and are carried forward untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_scenario: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_gear: Option<GearSnapshot>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skip_lighting: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl EngineContext {
    pub fn is_empty(&self) -> bool {
        self.current_scenario.is_none()
            && self.matched_gear.is_none()
            && !self.skip_lighting
            && self.extra.is_empty()
    }

    /// Active scenario key, ignoring blank values.
    pub fn scenario(&self) -> Option<&str> {
        self.current_scenario
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    /// Context for a freshly started scenario, merged over `self`: the named
    /// fields are replaced, `extra` entries survive.
    pub fn start_scenario(
        &self,
        scenario: &str,
        gear: GearSnapshot,
        skip_lighting: bool,
    ) -> Self {
        Self {
            current_scenario: Some(scenario.to_string()),
            matched_gear: Some(gear),
            skip_lighting,
            extra: self.extra.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversation state
// ---------------------------------------------------------------------------

/// Per-session state as persisted by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    #[serde(default)]
    pub current_step: StepNumber,
    #[serde(default)]
    pub conversation_context: EngineContext,
}

impl ConversationState {
    pub fn new(current_step: StepNumber, conversation_context: EngineContext) -> Self {
        Self {
            current_step,
            conversation_context,
        }
    }

    /// Rebuild state from loosely-typed stored columns.
    ///
    /// Negative or missing steps become `0`. A context that is missing, not a
    /// JSON object, or otherwise unparseable becomes empty.
    pub fn from_persisted(current_step: Option<i64>, context: Option<&serde_json::Value>) -> Self {
        let step = current_step
            .and_then(|s| StepNumber::try_from(s).ok())
            .unwrap_or(0);

        let conversation_context = match context {
            None | Some(serde_json::Value::Null) => EngineContext::default(),
            Some(value @ serde_json::Value::Object(_)) => {
                serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Discarding unparseable conversation context");
                    EngineContext::default()
                })
            }
            Some(other) => {
                tracing::warn!(
                    kind = json_kind(other),
                    "Discarding non-object conversation context"
                );
                EngineContext::default()
            }
        };

        Self::new(step, conversation_context)
    }

    /// Apply a turn's state update, the way a persisting caller would.
    pub fn apply(&mut self, result: &TurnResult) {
        self.current_step = result.next_step;
        self.conversation_context = result.context.clone();
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Turn result
// ---------------------------------------------------------------------------

/// Kind of bot message, for callers that render special message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    ImageAnalysis,
}

/// Everything the caller needs after one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    pub content: String,
    /// Step just shown, if any.
    pub step_number: Option<StepNumber>,
    /// Step the caller should persist as the new current step.
    pub next_step: StepNumber,
    pub awaiting_continuation: bool,
    pub context: EngineContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<MessageType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl TurnResult {
    /// A reply that ends any walkthrough and clears the context.
    pub fn reset(content: impl Into<String>, step_number: Option<StepNumber>) -> Self {
        Self {
            content: content.into(),
            step_number,
            next_step: 0,
            awaiting_continuation: false,
            context: EngineContext::default(),
            message_type: None,
            metadata: None,
        }
    }

    /// A reply that leaves the caller's step and context as they were.
    pub fn preserving(
        content: impl Into<String>,
        state: &ConversationState,
        skill_level: SkillLevel,
    ) -> Self {
        Self {
            content: content.into(),
            step_number: None,
            next_step: state.current_step,
            awaiting_continuation: walkthrough_active(state, skill_level),
            context: state.conversation_context.clone(),
            message_type: None,
            metadata: None,
        }
    }
}

/// Whether `state` is mid-walkthrough and a "yes" at `skill_level` would
/// continue it. Only walkthrough levels ever continue.
pub fn walkthrough_active(state: &ConversationState, skill_level: SkillLevel) -> bool {
    skill_level.uses_walkthrough()
        && (1..=3).contains(&state.current_step)
        && state.conversation_context.scenario().is_some()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
