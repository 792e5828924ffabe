//! Image-analysis turns through the async entry point, using stub analyzers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use synthia_core::gear::{GearCategory, GearItem};
use synthia_core::image_analysis::MISSING_FIELD;
use synthia_core::{
    AnalysisError, AnalysisMode, ConversationState, EngineContext, Engine, ImageAnalyzer, ImageRef,
    KnowledgeBase, MessageType, NoopAnalyzer, SkillLevel, TurnRequest,
};

// ---------------------------------------------------------------------------
// Stub analyzers
// ---------------------------------------------------------------------------

/// Returns a fixed analysis and records what it was asked.
struct FixedAnalyzer {
    analysis: Value,
    calls: AtomicUsize,
    last: Mutex<Option<(String, AnalysisMode)>>,
}

impl FixedAnalyzer {
    fn new(analysis: Value) -> Self {
        Self {
            analysis,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }
}

impl ImageAnalyzer for FixedAnalyzer {
    async fn analyze(&self, image: &ImageRef, mode: AnalysisMode) -> Result<Value, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some((image.path.clone(), mode));
        Ok(self.analysis.clone())
    }
}

/// Always fails with the given reason.
struct FailingAnalyzer(&'static str);

impl ImageAnalyzer for FailingAnalyzer {
    async fn analyze(
        &self,
        _image: &ImageRef,
        _mode: AnalysisMode,
    ) -> Result<Value, AnalysisError> {
        Err(AnalysisError::Failed(self.0.to_string()))
    }
}

fn engine() -> Engine {
    Engine::with_seed(Arc::new(KnowledgeBase::builtin()), 3)
}

fn mid_walkthrough() -> ConversationState {
    ConversationState::new(
        2,
        EngineContext {
            current_scenario: Some("boudoir".to_string()),
            ..Default::default()
        },
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failure_reason_is_shown_and_state_untouched() {
    let state = mid_walkthrough();
    let images = [ImageRef::new("/uploads/a.jpg")];
    let request = TurnRequest::new("what do you think?", SkillLevel::Beginner, &state)
        .with_images(&images);

    let result = engine().generate_response(request, &FailingAnalyzer("X")).await;

    assert!(result.content.contains("X"));
    assert_eq!(result.next_step, state.current_step);
    assert_eq!(result.context, state.conversation_context);
    assert_eq!(result.step_number, None);
}

#[tokio::test]
async fn noop_analyzer_reports_not_configured() {
    let state = ConversationState::default();
    let images = [ImageRef::new("/uploads/a.png")];
    let request = TurnRequest::new("", SkillLevel::Advanced, &state).with_images(&images);

    let result = engine().generate_response(request, &NoopAnalyzer).await;
    assert!(result.content.contains("image analysis is not configured"));
    assert!(result.context.is_empty());
}

#[tokio::test]
async fn inspiration_analysis_is_rendered_with_metadata() {
    let analysis = json!({
        "lighting_analysis": {"primary_light_source": "Window light from the left"},
        "composition": {"focal_length": "85mm"},
        "recreate_tips": {"step_by_step": ["Seat the subject by a window"]}
    });
    let analyzer = FixedAnalyzer::new(analysis.clone());
    let gear = vec![
        GearItem::new(GearCategory::CameraBody, "Fujifilm", "X-T5"),
        GearItem::new(GearCategory::Lens, "Fujifilm", "XF 56mm f/1.2"),
        GearItem::new(GearCategory::Lens, "Fujifilm", "XF 70-300mm"),
    ];
    let state = mid_walkthrough();
    let images = [ImageRef::new("/uploads/ref.jpg"), ImageRef::new("/uploads/other.jpg")];
    let request = TurnRequest::new("I love this look", SkillLevel::Intermediate, &state)
        .with_gear(&gear)
        .with_images(&images);

    let result = engine().generate_response(request, &analyzer).await;

    assert_eq!(analyzer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        *analyzer.last.lock().unwrap(),
        Some(("/uploads/ref.jpg".to_string(), AnalysisMode::Inspiration))
    );

    assert_eq!(result.message_type, Some(MessageType::ImageAnalysis));
    assert!(result.content.contains("Window light from the left"));
    assert!(result.content.contains("Styling Notes"));
    assert!(result.content.contains(MISSING_FIELD));
    assert!(result.content.contains("your Fujifilm XF 70-300mm covers ~85mm"));

    let metadata = result.metadata.expect("metadata present");
    assert_eq!(metadata["analysis_type"], "inspiration");
    assert_eq!(metadata["image"], "/uploads/ref.jpg");
    assert_eq!(metadata["analysis"], analysis);

    assert_eq!(result.next_step, 2);
    // Intermediate users never continue a walkthrough with "yes".
    assert!(!result.awaiting_continuation);
    assert_eq!(result.context, state.conversation_context);
}

#[tokio::test]
async fn critique_request_uses_technique_mode() {
    let analyzer = FixedAnalyzer::new(json!({
        "strengths": ["Clean background"],
        "overall_rating": "8/10"
    }));
    let state = ConversationState::default();
    let images = [ImageRef::new("/uploads/mine.jpg")];
    let request = TurnRequest::new("Please critique my shot", SkillLevel::Beginner, &state)
        .with_images(&images);

    let result = engine().generate_response(request, &analyzer).await;

    assert_eq!(
        analyzer.last.lock().unwrap().as_ref().map(|(_, mode)| *mode),
        Some(AnalysisMode::Technique)
    );
    assert!(result.content.contains("Clean background"));
    assert!(result.content.contains("**Overall Rating:** 8/10"));
    assert_eq!(result.metadata.unwrap()["analysis_type"], "technique");
}

#[tokio::test]
async fn text_turns_never_call_the_analyzer() {
    let analyzer = FixedAnalyzer::new(json!({}));
    let state = ConversationState::default();
    let request = TurnRequest::new("high key glamour", SkillLevel::Beginner, &state);

    let result = engine().generate_response(request, &analyzer).await;

    assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    assert_eq!(result.step_number, Some(1));
    assert_eq!(result.message_type, None);
}
