//! End-to-end chat session tests: validation, storage and engine wiring.

use assert_matches::assert_matches;
use synthia_chat::config::ChatConfig;
use synthia_chat::input::InputError;
use synthia_chat::{build_engine, ChatError, ChatSession};
use synthia_core::{GearCategory, GearItem, NoopAnalyzer, SkillLevel};

fn session(skill: SkillLevel) -> ChatSession<NoopAnalyzer> {
    let config = ChatConfig {
        advice_seed: Some(1),
        ..Default::default()
    };
    let gear = vec![
        GearItem::new(GearCategory::CameraBody, "Canon", "R6"),
        GearItem::new(GearCategory::Lens, "Canon", "RF 50mm f/1.8"),
    ];
    ChatSession::new(build_engine(&config), NoopAnalyzer, skill, gear)
}

#[tokio::test]
async fn walkthrough_state_is_stored_between_turns() {
    let mut chat = session(SkillLevel::Beginner);

    let first = chat.send("glamour beauty shot").await.unwrap();
    assert_eq!(first.step_number, Some(1));
    assert!(first.content.contains("Canon R6"));
    assert_eq!(chat.store().to_json()["current_step"], 1);
    assert_eq!(
        chat.store().to_json()["conversation_context"]["current_scenario"],
        "high_key_glamour"
    );

    let second = chat.send("yes").await.unwrap();
    assert_eq!(second.step_number, Some(2));

    chat.reset();
    let after_reset = chat.send("yes").await.unwrap();
    assert_eq!(after_reset.next_step, 0);
    assert!(after_reset.content.contains("lost track"));
}

#[tokio::test]
async fn image_turn_without_vision_keeps_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("look.png");
    std::fs::write(&path, b"png-ish").unwrap();

    let mut chat = session(SkillLevel::Beginner);
    chat.send("boudoir").await.unwrap();
    let before = chat.store().to_json();

    let result = chat
        .send_image(path.to_str().unwrap(), "recreate this")
        .await
        .unwrap();
    assert!(result.content.contains("image analysis is not configured"));
    assert_eq!(chat.store().to_json(), before);
}

#[tokio::test]
async fn invalid_image_never_reaches_the_engine() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.pdf");
    std::fs::write(&path, b"%PDF").unwrap();

    let mut chat = session(SkillLevel::Intermediate);
    chat.send("corporate headshot").await.unwrap();
    let before = chat.store().to_json();

    let err = chat
        .send_image(path.to_str().unwrap(), "")
        .await
        .unwrap_err();
    assert_matches!(err, ChatError::Input(InputError::Validation(_)));
    assert_eq!(chat.store().to_json(), before);
}

#[tokio::test]
async fn specialization_reaches_general_advice() {
    let mut chat = session(SkillLevel::Advanced).with_specialization(Some("pet".to_string()));
    let result = chat.send("hello").await.unwrap();
    assert!(result.content.contains("focus on pet photography"));
}
