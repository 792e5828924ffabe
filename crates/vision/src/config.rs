use std::fmt;

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";

/// Default vision model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Vision client configuration loaded from environment variables.
#[derive(Clone)]
pub struct VisionConfig {
    /// Bearer token. When absent every analysis fails with
    /// [`VisionError::NotConfigured`](crate::VisionError::NotConfigured).
    pub api_key: Option<String>,
    /// API base URL without the `/chat/completions` suffix.
    pub api_url: String,
    pub model: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Longest image side, in pixels, before the image is downscaled.
    pub max_image_px: u32,
}

impl VisionConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                      |
    /// |-----------------------|------------------------------|
    /// | `OPENAI_API_KEY`      | unset                        |
    /// | `VISION_API_URL`      | `https://api.openai.com/v1`  |
    /// | `VISION_MODEL`        | `gpt-4o`                     |
    /// | `VISION_TIMEOUT_SECS` | `60`                         |
    /// | `VISION_MAX_IMAGE_PX` | `1024`                       |
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let api_url = std::env::var("VISION_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());

        let model = std::env::var("VISION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        let timeout_secs: u64 = std::env::var("VISION_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("VISION_TIMEOUT_SECS must be a valid u64");

        let max_image_px: u32 = std::env::var("VISION_MAX_IMAGE_PX")
            .unwrap_or_else(|_| "1024".into())
            .parse()
            .expect("VISION_MAX_IMAGE_PX must be a valid u32");

        Self {
            api_key,
            api_url,
            model,
            timeout_secs,
            max_image_px,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// `POST` target for analysis requests.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_url.trim_end_matches('/'))
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 60,
            max_image_px: 1024,
        }
    }
}

// The API key never reaches logs.
impl fmt::Debug for VisionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_image_px", &self.max_image_px)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = VisionConfig::default();
        assert_eq!(config.api_url, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.max_image_px, 1024);
        assert!(!config.is_configured());
    }

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        let config = VisionConfig {
            api_url: "http://localhost:9000/v1/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.completions_url(), "http://localhost:9000/v1/chat/completions");
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = VisionConfig {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
