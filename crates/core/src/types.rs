//! Shared primitive types for the dialogue engine.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Step counter value persisted by the caller. `0` means no walkthrough.
pub type StepNumber = u32;

// ---------------------------------------------------------------------------
// Skill level
// ---------------------------------------------------------------------------

/// Photographer skill level chosen at onboarding.
///
/// Beginners get the multi-turn walkthrough; everyone else gets a single
/// comprehensive response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    /// Parse a stored skill level. Case-insensitive, surrounding whitespace ignored.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(CoreError::Validation(format!(
                "Invalid skill level '{s}'. Must be one of: Beginner, Intermediate, Advanced"
            ))),
        }
    }

    /// Canonical display / storage form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    /// Whether this level is routed through the step-by-step walkthrough.
    pub fn uses_walkthrough(&self) -> bool {
        matches!(self, Self::Beginner)
    }
}

impl std::fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
