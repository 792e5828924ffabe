//! Terminal caller for the Synthia dialogue engine.
//!
//! Plays the part a web backend would: validates input, owns the session's
//! persisted state, hands each turn to the engine and stores the update.

pub mod config;
pub mod gear_profile;
pub mod input;
pub mod store;

use std::sync::Arc;

use synthia_core::{
    Engine, GearItem, ImageAnalyzer, KnowledgeBase, SkillLevel, TurnRequest, TurnResult,
};

use crate::config::ChatConfig;
use crate::input::{ImageUpload, InputError};
use crate::store::SessionStore;

/// Errors from a single chat turn.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("could not store session state: {0}")]
    Store(#[from] serde_json::Error),
}

/// Build the engine described by `config`.
pub fn build_engine(config: &ChatConfig) -> Engine {
    let kb = match &config.knowledge_base_path {
        Some(path) => KnowledgeBase::load_or_empty(path),
        None => KnowledgeBase::builtin(),
    };
    tracing::info!(scenarios = kb.len(), "Knowledge base ready");

    let kb = Arc::new(kb);
    match config.advice_seed {
        Some(seed) => Engine::with_seed(kb, seed),
        None => Engine::new(kb),
    }
}

/// One user's conversation.
pub struct ChatSession<A> {
    engine: Engine,
    analyzer: A,
    skill_level: SkillLevel,
    gear: Vec<GearItem>,
    specialization: Option<String>,
    store: SessionStore,
}

impl<A: ImageAnalyzer> ChatSession<A> {
    pub fn new(
        engine: Engine,
        analyzer: A,
        skill_level: SkillLevel,
        gear: Vec<GearItem>,
    ) -> Self {
        Self {
            engine,
            analyzer,
            skill_level,
            gear,
            specialization: None,
            store: SessionStore::new(),
        }
    }

    pub fn with_specialization(mut self, specialization: Option<String>) -> Self {
        self.specialization = specialization;
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn reset(&mut self) {
        self.store.clear();
        tracing::info!("Session state cleared");
    }

    /// Send a text message.
    pub async fn send(&mut self, message: &str) -> Result<TurnResult, ChatError> {
        self.turn(message, None).await
    }

    /// Send a message with an image attached. The file is validated first.
    pub async fn send_image(&mut self, path: &str, message: &str) -> Result<TurnResult, ChatError> {
        let upload = ImageUpload::from_path(path)?;
        self.turn(message, Some(upload)).await
    }

    async fn turn(
        &mut self,
        message: &str,
        upload: Option<ImageUpload>,
    ) -> Result<TurnResult, ChatError> {
        let state = self.store.load();
        let images: Vec<_> = upload.iter().map(ImageUpload::to_image_ref).collect();

        let request = TurnRequest::new(message, self.skill_level, &state)
            .with_gear(&self.gear)
            .with_images(&images)
            .with_specialization(self.specialization.as_deref());

        let result = self.engine.generate_response(request, &self.analyzer).await;
        self.store.save(&result)?;

        tracing::debug!(
            step = ?result.step_number,
            next_step = result.next_step,
            awaiting = result.awaiting_continuation,
            "Turn stored"
        );
        Ok(result)
    }
}
