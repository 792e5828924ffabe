//! Synthia dialogue engine.
//!
//! Turns a free-text message, the session's conversation state, the user's
//! skill level and owned gear into the next reply plus an updated state:
//!
//! - [`knowledge`]: scenario guidance loaded once and shared read-only.
//! - [`intent`]: keyword classification and style extraction.
//! - [`gear`]: bucketing, template personalization, best-pick scoring.
//! - [`special_cases`]: ordered advisory rules (astro, infrared, drone, ...).
//! - [`walkthrough`]: the beginner step machine and comprehensive replies.
//! - [`followup`], [`advice`], [`image_analysis`]: the remaining reply paths.
//! - [`engine`]: the per-turn entry point.

pub mod advice;
pub mod engine;
pub mod error;
pub mod followup;
pub mod gear;
pub mod image_analysis;
pub mod intent;
pub mod knowledge;
pub mod session;
pub mod special_cases;
pub mod types;
pub mod walkthrough;

pub use engine::{Engine, TurnRequest};
pub use error::CoreError;
pub use gear::{GearCategory, GearItem};
pub use image_analysis::{AnalysisError, AnalysisMode, ImageAnalyzer, ImageRef, NoopAnalyzer};
pub use knowledge::KnowledgeBase;
pub use session::{ConversationState, EngineContext, MessageType, TurnResult};
pub use types::SkillLevel;
