//! HTTP client for an OpenAI-compatible chat-completions endpoint.

use std::path::Path;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use serde::Deserialize;
use serde_json::{json, Value};
use synthia_core::{AnalysisError, AnalysisMode, ImageAnalyzer, ImageRef};

use crate::config::VisionConfig;
use crate::error::VisionError;
use crate::prompts;

/// JPEG quality for the re-encoded upload.
pub const JPEG_QUALITY: u8 = 85;

/// Completion token cap for one analysis.
pub const MAX_TOKENS: u32 = 1000;

/// Vision-model client. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct VisionClient {
    client: reqwest::Client,
    config: VisionConfig,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl VisionClient {
    /// Build a client with the configured request timeout.
    pub fn new(config: VisionConfig) -> Result<Self, VisionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: VisionConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    /// Analyze the image at `path` and return the model's JSON document.
    pub async fn analyze_image(
        &self,
        path: &Path,
        mode: AnalysisMode,
    ) -> Result<Value, VisionError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(VisionError::NotConfigured)?;

        let encoded = {
            let path = path.to_path_buf();
            let max_px = self.config.max_image_px;
            tokio::task::spawn_blocking(move || encode_image(&path, max_px)).await??
        };

        tracing::info!(
            mode = mode.as_str(),
            model = %self.config.model,
            encoded_bytes = encoded.len(),
            "Requesting image analysis"
        );

        let body = request_body(&self.config.model, mode, &encoded);
        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let completion: ChatCompletion = response.json().await?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(VisionError::EmptyResponse)?;

        Ok(serde_json::from_str(&content)?)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`VisionError::Api`] with the
    /// status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, VisionError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(VisionError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

impl ImageAnalyzer for VisionClient {
    async fn analyze(&self, image: &ImageRef, mode: AnalysisMode) -> Result<Value, AnalysisError> {
        self.analyze_image(Path::new(&image.path), mode)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, image = %image.path, "Vision request failed");
                AnalysisError::Failed(e.to_string())
            })
    }
}

/// Chat-completions payload: system persona, prompt, and the inline image.
pub fn request_body(model: &str, mode: AnalysisMode, encoded_jpeg: &str) -> Value {
    json!({
        "model": model,
        "messages": [
            {"role": "system", "content": prompts::SYSTEM_PROMPT},
            {
                "role": "user",
                "content": [
                    {"type": "text", "text": prompts::prompt_for(mode)},
                    {
                        "type": "image_url",
                        "image_url": {"url": format!("data:image/jpeg;base64,{encoded_jpeg}")}
                    }
                ]
            }
        ],
        "response_format": {"type": "json_object"},
        "max_tokens": MAX_TOKENS,
    })
}

/// Decode the image, shrink it so the longest side is at most `max_px`
/// (aspect preserved), flatten to RGB and return it as base64 JPEG.
pub fn encode_image(path: &Path, max_px: u32) -> Result<String, VisionError> {
    let img = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?;

    let img = if img.width().max(img.height()) > max_px {
        img.thumbnail(max_px, max_px)
    } else {
        img
    };

    let mut bytes = Vec::new();
    img.to_rgb8()
        .write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY))?;

    Ok(BASE64.encode(bytes))
}
