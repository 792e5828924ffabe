//! Vision-model client for Synthia's image-analysis path.
//!
//! Implements [`synthia_core::ImageAnalyzer`] against an OpenAI-compatible
//! chat-completions endpoint: the image is downscaled, re-encoded as JPEG,
//! sent inline as a base64 data URL together with a mode-specific prompt,
//! and the model's JSON reply is returned as-is.

pub mod client;
pub mod config;
pub mod error;
pub mod prompts;

pub use client::VisionClient;
pub use config::VisionConfig;
pub use error::VisionError;
