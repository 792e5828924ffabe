/// Errors from the vision client.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// No API key was configured.
    #[error("image analysis is not configured (OPENAI_API_KEY is unset)")]
    NotConfigured,

    /// The image file could not be read.
    #[error("could not read image: {0}")]
    Io(#[from] std::io::Error),

    /// The image could not be decoded or re-encoded.
    #[error("could not process image: {0}")]
    Image(#[from] image::ImageError),

    /// The blocking encode task panicked or was cancelled.
    #[error("image encoding task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Vision API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The completion carried no message content.
    #[error("Empty response from vision API")]
    EmptyResponse,

    /// The message content was not a JSON document.
    #[error("vision API returned invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
