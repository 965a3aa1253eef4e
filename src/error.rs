//! Error types for image composition.

use std::path::PathBuf;

/// Maximum length of an API error body surfaced to the user.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Errors that can occur while composing an image.
#[derive(Debug, thiserror::Error)]
pub enum BlendError {
    /// API key missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        message: String,
    },

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters (including a wrong number of inputs).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// An input image does not exist or is not a regular file.
    #[error("input image not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// The response parsed but lacked the expected fields.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The model answered with text where an image was expected.
    #[error("model returned text instead of an image: {0}")]
    TextOnly(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., reading an input or saving the output).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for composition operations.
pub type Result<T> = std::result::Result<T, BlendError>;

/// Maps a non-success HTTP status and body from a Google endpoint to an error.
pub(crate) fn from_status(status: u16, body: &str) -> BlendError {
    let message = sanitize_error_message(body);
    match status {
        401 | 403 => BlendError::Auth(message),
        404 => BlendError::InvalidRequest(
            "Model not found. Verify the model name is correct.".into(),
        ),
        _ => BlendError::Api { status, message },
    }
}

/// Redacts anything that looks like a Google API key and truncates the text.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let redacted = text
        .split_inclusive(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .map(|chunk| {
            let token_len = chunk
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
                .unwrap_or(chunk.len());
            let (token, rest) = chunk.split_at(token_len);
            if token.starts_with("AIza") && token.len() >= 30 {
                format!("[REDACTED]{rest}")
            } else {
                chunk.to_string()
            }
        })
        .collect::<String>();

    let trimmed = redacted.trim();
    if trimmed.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let cut: String = trimmed.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        format!("{cut}...")
    } else {
        trimmed.to_string()
    }
}
