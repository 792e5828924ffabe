//! Engine entry point: one call per conversational turn.
//!
//! The engine owns the knowledge base and the advice picker; everything else
//! (message, skill level, gear, session state, attached images) arrives with
//! the request. The returned [`TurnResult`] carries the reply and the state
//! the caller should persist.

use std::sync::Arc;

use serde_json::json;

use crate::advice::{self, AdvicePicker};
use crate::gear::{self, GearBuckets, GearItem};
use crate::image_analysis::{self, AnalysisMode, ImageAnalyzer, ImageRef};
use crate::intent;
use crate::knowledge::KnowledgeBase;
use crate::session::{ConversationState, MessageType, TurnResult};
use crate::types::SkillLevel;
use crate::{followup, walkthrough};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Inputs for a single turn.
#[derive(Debug, Clone, Copy)]
pub struct TurnRequest<'a> {
    pub message: &'a str,
    pub skill_level: SkillLevel,
    pub gear: &'a [GearItem],
    pub state: &'a ConversationState,
    pub images: &'a [ImageRef],
    /// The user's photography specialization, if their profile has one.
    pub specialization: Option<&'a str>,
}

impl<'a> TurnRequest<'a> {
    /// A text-only request with no gear and no specialization.
    pub fn new(message: &'a str, skill_level: SkillLevel, state: &'a ConversationState) -> Self {
        Self {
            message,
            skill_level,
            gear: &[],
            state,
            images: &[],
            specialization: None,
        }
    }

    pub fn with_gear(mut self, gear: &'a [GearItem]) -> Self {
        self.gear = gear;
        self
    }

    pub fn with_images(mut self, images: &'a [ImageRef]) -> Self {
        self.images = images;
        self
    }

    pub fn with_specialization(mut self, specialization: Option<&'a str>) -> Self {
        self.specialization = specialization;
        self
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The dialogue engine. Cheap to share across sessions behind an `Arc`.
#[derive(Debug)]
pub struct Engine {
    kb: Arc<KnowledgeBase>,
    advice: AdvicePicker,
}

impl Engine {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self {
            kb,
            advice: AdvicePicker::from_entropy(),
        }
    }

    /// Engine whose general-advice selection is reproducible.
    pub fn with_seed(kb: Arc<KnowledgeBase>, seed: u64) -> Self {
        Self {
            kb,
            advice: AdvicePicker::seeded(seed),
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Produce the reply for one turn.
    ///
    /// Attached images short-circuit to image analysis (first image only);
    /// otherwise the turn is handled by [`Engine::respond_to_text`].
    pub async fn generate_response<A: ImageAnalyzer>(
        &self,
        request: TurnRequest<'_>,
        analyzer: &A,
    ) -> TurnResult {
        match request.images.first() {
            Some(image) => self.respond_to_image(&request, image, analyzer).await,
            None => self.respond_to_text(&request),
        }
    }

    /// Text turn. Order of checks:
    ///
    /// 1. continuation (Beginner) advances the walkthrough;
    /// 2. decline (Beginner, or any level with an active scenario) resets;
    /// 3. follow-up on an active scenario drills into that scenario;
    /// 4. a recognised style starts a walkthrough or a comprehensive reply;
    /// 5. anything else gets general advice.
    pub fn respond_to_text(&self, request: &TurnRequest<'_>) -> TurnResult {
        let message = request.message;
        let state = request.state;
        let beginner = request.skill_level.uses_walkthrough();
        let active = state.conversation_context.scenario();
        let category = intent::classify(message);

        tracing::debug!(
            intent = ?category,
            skill_level = %request.skill_level,
            step = state.current_step,
            scenario = ?active,
            "Classified message"
        );

        if beginner && intent::is_continuation(message) {
            return walkthrough::advance(&self.kb, state);
        }

        if intent::is_decline(message) && (beginner || active.is_some()) {
            return walkthrough::decline();
        }

        if let Some(scenario) = active {
            if intent::is_followup(message) {
                let Some(guide) = self.kb.get(scenario) else {
                    tracing::warn!(
                        scenario,
                        "Follow-up on a scenario missing from the knowledge base"
                    );
                    return walkthrough::lost_context();
                };
                let buckets = followup_gear(request);
                let topic = intent::followup_topic(message);
                return followup::respond(
                    guide,
                    scenario,
                    topic,
                    &buckets,
                    request.skill_level,
                    state,
                );
            }
        }

        if let Some(scenario) = intent::extract_style(message, &self.kb) {
            let buckets = gear::bucket(request.gear);
            let prior = &state.conversation_context;
            return if beginner {
                walkthrough::start(&self.kb, scenario, message, &buckets, prior)
            } else {
                walkthrough::comprehensive(&self.kb, scenario, message, &buckets, prior)
            };
        }

        advice::general_response(
            &self.advice,
            category,
            request.specialization,
            request.skill_level,
            state,
        )
    }

    async fn respond_to_image<A: ImageAnalyzer>(
        &self,
        request: &TurnRequest<'_>,
        image: &ImageRef,
        analyzer: &A,
    ) -> TurnResult {
        let mode = image_analysis::detect_mode(request.message);
        tracing::info!(
            mode = mode.as_str(),
            image = %image.path,
            attached = request.images.len(),
            "Analyzing image"
        );

        let analysis = match analyzer.analyze(image, mode).await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::error!(error = %e, image = %image.path, "Image analysis failed");
                let content = image_analysis::failure_message(&e);
                return TurnResult::preserving(content, request.state, request.skill_level);
            }
        };

        let content = match mode {
            AnalysisMode::Inspiration => image_analysis::render_inspiration(
                &analysis,
                request.skill_level,
                &gear::bucket(request.gear),
            ),
            AnalysisMode::Technique => {
                image_analysis::render_technique(&analysis, request.skill_level)
            }
        };

        let mut result = TurnResult::preserving(content, request.state, request.skill_level);
        result.message_type = Some(MessageType::ImageAnalysis);
        result.metadata = Some(json!({
            "analysis_type": mode.as_str(),
            "image": image.path,
            "analysis": analysis,
        }));
        result
    }
}

/// Gear for a follow-up: the request's gear, or the snapshot taken when
/// the scenario started if the caller sent none.
fn followup_gear(request: &TurnRequest<'_>) -> GearBuckets {
    if !request.gear.is_empty() {
        return gear::bucket(request.gear);
    }
    request
        .state
        .conversation_context
        .matched_gear
        .as_ref()
        .map(|snapshot| snapshot.to_buckets())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
