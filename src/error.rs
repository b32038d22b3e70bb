//! Error types for the image studio.

use std::time::Duration;

/// Fallback text shown when an upstream failure carries no message.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// Text shown when an uploaded file or data URL cannot be processed.
pub const DECODE_ERROR_MESSAGE: &str = "Failed to process image.";

/// Errors that can occur while driving the studio.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// Missing prompt or source images. The message is shown inline as-is.
    #[error("{0}")]
    Validation(String),

    /// File read or data URL decode failure.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// API key missing or rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The service returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized error body.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Server-provided retry hint.
        retry_after: Option<Duration>,
    },

    /// Prompt or output blocked by the service's safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// The edit response carried no inline image part.
    #[error("API did not return an image.")]
    NoImageReturned,

    /// The response could not be interpreted.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Network or HTTP transport error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Clipboard write failed while sharing.
    #[error("share failed: {0}")]
    Share(String),

    /// I/O error (reading uploads, saving downloads).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse error taxonomy used to decide how a failure is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Inline message next to the controls; state stays idle.
    Validation,
    /// Local decode failure with a generic message.
    Decode,
    /// Service failure shown in the top-level banner.
    Upstream,
    /// Transient toast only.
    Share,
}

impl StudioError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Returns which part of the taxonomy this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Decode(_) | Self::Io(_) => ErrorKind::Decode,
            Self::Share(_) => ErrorKind::Share,
            Self::Auth(_)
            | Self::Api { .. }
            | Self::RateLimited { .. }
            | Self::ContentBlocked(_)
            | Self::NoImageReturned
            | Self::UnexpectedResponse(_)
            | Self::Network(_)
            | Self::Json(_) => ErrorKind::Upstream,
        }
    }

    /// The message presented to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Share(msg) => msg.clone(),
            Self::Decode(_) | Self::Io(_) => DECODE_ERROR_MESSAGE.to_string(),
            other => {
                let msg = other.to_string();
                if msg.trim().is_empty() {
                    GENERIC_ERROR_MESSAGE.to_string()
                } else {
                    msg
                }
            }
        }
    }
}

/// Result type alias for studio operations.
pub type Result<T> = std::result::Result<T, StudioError>;

/// Maximum length of an error body carried into an error message.
const MAX_ERROR_MESSAGE_LEN: usize = 300;

/// Reduces a raw error body to something fit for display.
///
/// Google APIs wrap failures as `{"error": {"message": ...}}`; when that shape
/// is present only the message is kept. Anything else is trimmed and cut to
/// a bounded length.
pub(crate) fn sanitize_error_message(body: &str) -> String {
    let extracted = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });

    let text = extracted.unwrap_or_else(|| body.trim().to_string());
    if text.chars().count() > MAX_ERROR_MESSAGE_LEN {
        let cut: String = text.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        format!("{cut}...")
    } else {
        text
    }
}

/// Reads a `Retry-After` header expressed in seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
