//! Boundary validation and command parsing for REPL lines.

use std::path::Path;

use synthia_core::ImageRef;
use validator::{Validate, ValidationError};

/// Longest accepted message, in characters.
pub const MAX_MESSAGE_CHARS: u64 = 2000;

/// Largest accepted upload.
pub const MAX_IMAGE_BYTES: u64 = 16 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Errors raised before a line reaches the engine.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("invalid input: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("could not read image {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("usage: /image <path> [message]")]
    MissingImagePath,
}

// ---------------------------------------------------------------------------
// Validated inputs
// ---------------------------------------------------------------------------

/// A chat message as typed by the user.
#[derive(Debug, Clone, Validate)]
pub struct ChatMessage {
    #[validate(length(
        min = 1,
        max = MAX_MESSAGE_CHARS,
        message = "message must be 1-2000 characters"
    ))]
    pub text: String,
}

/// An image the user asked to attach.
#[derive(Debug, Clone, Validate)]
pub struct ImageUpload {
    #[validate(custom(function = "validate_image_extension"))]
    pub path: String,
    #[validate(range(max = MAX_IMAGE_BYTES, message = "image must be 16 MiB or smaller"))]
    pub size_bytes: u64,
}

fn validate_image_extension(path: &str) -> Result<(), ValidationError> {
    match extension(path) {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => {
            let mut err = ValidationError::new("image_extension");
            err.message = Some("image must be png, jpg, jpeg, gif or webp".into());
            Err(err)
        }
    }
}

fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

impl ImageUpload {
    /// Stat the file at `path` and validate it.
    pub fn from_path(path: &str) -> Result<Self, InputError> {
        let metadata = std::fs::metadata(path).map_err(|source| InputError::Io {
            path: path.to_string(),
            source,
        })?;
        let upload = Self {
            path: path.to_string(),
            size_bytes: metadata.len(),
        };
        upload.validate()?;
        Ok(upload)
    }

    pub fn content_type(&self) -> Option<&'static str> {
        match extension(&self.path)?.as_str() {
            "png" => Some("image/png"),
            "jpg" | "jpeg" => Some("image/jpeg"),
            "gif" => Some("image/gif"),
            "webp" => Some("image/webp"),
            _ => None,
        }
    }

    pub fn to_image_ref(&self) -> ImageRef {
        ImageRef {
            path: self.path.clone(),
            content_type: self.content_type().map(str::to_string),
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// One parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Message(String),
    Image { path: String, message: String },
    /// Forget the session state.
    Reset,
    /// Print the persisted session state.
    State,
    Quit,
}

/// Parse a raw line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let command = match line {
        "/quit" | "/exit" => Command::Quit,
        "/reset" => Command::Reset,
        "/state" => Command::State,
        _ => match line.strip_prefix("/image") {
            Some(rest) => {
                let rest = rest.trim();
                let (path, message) = match rest.split_once(char::is_whitespace) {
                    Some((path, message)) => (path, message.trim()),
                    None => (rest, ""),
                };
                if path.is_empty() {
                    return Err(InputError::MissingImagePath);
                }
                Command::Image {
                    path: path.to_string(),
                    message: message.to_string(),
                }
            }
            None => {
                let message = ChatMessage {
                    text: line.to_string(),
                };
                message.validate()?;
                Command::Message(message.text)
            }
        },
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    // -- parse_line --

    #[test]
    fn parses_plain_messages() {
        assert_eq!(
            parse_line("  dark moody fashion ").unwrap(),
            Some(Command::Message("dark moody fashion".to_string()))
        );
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn parses_control_commands() {
        assert_eq!(parse_line("/quit").unwrap(), Some(Command::Quit));
        assert_eq!(parse_line("/exit").unwrap(), Some(Command::Quit));
        assert_eq!(parse_line("/reset").unwrap(), Some(Command::Reset));
        assert_eq!(parse_line("/state").unwrap(), Some(Command::State));
    }

    #[test]
    fn parses_image_command() {
        assert_eq!(
            parse_line("/image shots/a.jpg critique this please").unwrap(),
            Some(Command::Image {
                path: "shots/a.jpg".to_string(),
                message: "critique this please".to_string(),
            })
        );
        assert_eq!(
            parse_line("/image b.png").unwrap(),
            Some(Command::Image {
                path: "b.png".to_string(),
                message: String::new(),
            })
        );
        assert_matches!(parse_line("/image"), Err(InputError::MissingImagePath));
    }

    #[test]
    fn rejects_overlong_messages() {
        let long = "a".repeat(MAX_MESSAGE_CHARS as usize + 1);
        assert_matches!(parse_line(&long), Err(InputError::Validation(_)));

        let limit = "é".repeat(MAX_MESSAGE_CHARS as usize);
        assert!(parse_line(&limit).is_ok());
    }

    // -- ImageUpload --

    #[test]
    fn accepts_supported_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Shot.JPG");
        std::fs::write(&path, b"bytes").unwrap();

        let upload = ImageUpload::from_path(path.to_str().unwrap()).unwrap();
        assert_eq!(upload.size_bytes, 5);
        assert_eq!(upload.content_type(), Some("image/jpeg"));
        assert_eq!(
            upload.to_image_ref().content_type.as_deref(),
            Some("image/jpeg")
        );
    }

    #[test]
    fn rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hi").unwrap();

        assert_matches!(
            ImageUpload::from_path(path.to_str().unwrap()),
            Err(InputError::Validation(_))
        );
    }

    #[test]
    fn rejects_oversized_image() {
        let upload = ImageUpload {
            path: "big.png".to_string(),
            size_bytes: MAX_IMAGE_BYTES + 1,
        };
        assert!(upload.validate().is_err());

        let at_limit = ImageUpload {
            size_bytes: MAX_IMAGE_BYTES,
            ..upload
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn missing_file_is_io_error() {
        assert_matches!(
            ImageUpload::from_path("/no/such/file.png"),
            Err(InputError::Io { .. })
        );
    }
}
