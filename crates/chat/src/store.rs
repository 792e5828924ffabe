//! In-memory session store holding state in its persisted shape.
//!
//! The step is kept as a signed integer and the context as raw JSON, the way
//! a database row would hold them, so every turn goes through the same
//! lenient decode a persisting caller performs.

use serde_json::Value;
use synthia_core::{ConversationState, TurnResult};

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    current_step: Option<i64>,
    conversation_context: Option<Value>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the stored row into engine state.
    pub fn load(&self) -> ConversationState {
        ConversationState::from_persisted(self.current_step, self.conversation_context.as_ref())
    }

    /// Replace the stored row with a turn's state update.
    pub fn save(&mut self, result: &TurnResult) -> Result<(), serde_json::Error> {
        let context = serde_json::to_value(&result.context)?;
        self.current_step = Some(i64::from(result.next_step));
        self.conversation_context = Some(context);
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The stored row as JSON, for display.
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "current_step": self.current_step.unwrap_or(0),
            "conversation_context": self
                .conversation_context
                .clone()
                .unwrap_or_else(|| serde_json::json!({})),
        })
    }
}
