//! Error types for image requests and environment probing.

use serde::Serialize;
use std::time::Duration;

/// Usage line reported when the requestor is invoked without its arguments.
pub const USAGE: &str = "genimg <prompt> <api_key>";

/// Failure classes a caller can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Wrong or missing command-line arguments.
    Argument,
    /// A required library or tool is missing and could not be provided.
    Dependency,
    /// Client construction, network, or API status failure.
    Transport,
    /// A well-formed response that lacks the expected content.
    Content,
}

/// Well-formed responses that do not carry what was asked for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    /// The API answered with an empty body.
    #[error("Empty response from Gemini API")]
    EmptyResponse,
    /// No candidates were returned.
    #[error("No candidates in response")]
    NoCandidates,
    /// The first candidate had no content parts.
    #[error("No content parts in response")]
    NoContentParts,
    /// Parts were returned, but none carried inline image data.
    #[error("No image data in response")]
    NoImageData,
}

/// Errors that can occur while requesting an image or probing the environment.
#[derive(Debug, thiserror::Error)]
pub enum GenImgError {
    /// Fewer positional arguments than required.
    #[error("Missing arguments. Usage: {usage}")]
    MissingArguments { usage: &'static str },

    /// Arguments were present but unusable.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// A dependency was missing and could not be installed.
    #[error("dependency unavailable: {name}: {reason}")]
    DependencyUnavailable { name: String, reason: String },

    /// API key rejected.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Request or subprocess exceeded its time budget.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The image to restyle could not be loaded.
    #[error("failed to load input image {location}: {reason}")]
    InputImage { location: String, reason: String },

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected content missing from an otherwise valid response.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// I/O error (e.g., spawning a subprocess).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A subprocess ran but exited unsuccessfully.
    #[error("command `{program}` failed ({status}): {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },
}

impl GenImgError {
    /// Classifies this error into the requestor's failure taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingArguments { .. } | Self::InvalidArguments(_) => ErrorKind::Argument,
            Self::DependencyUnavailable { .. } | Self::CommandFailed { .. } => {
                ErrorKind::Dependency
            }
            Self::Content(_) | Self::ContentBlocked(_) => ErrorKind::Content,
            Self::Auth(_)
            | Self::Api { .. }
            | Self::Timeout(_)
            | Self::Network(_)
            | Self::InputImage { .. }
            | Self::Decode(_)
            | Self::Json(_)
            | Self::Io(_) => ErrorKind::Transport,
        }
    }

    /// Maps a reqwest failure, folding its timeouts into [`GenImgError::Timeout`].
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::Network(err)
        }
    }
}

/// Result type alias for image requests and probes.
pub type Result<T> = std::result::Result<T, GenImgError>;

/// Masks an API key down to its first four characters for logging.
pub fn mask_api_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    if key.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}...")
    }
}

/// Trims an upstream error body and strips any echo of the API key.
pub(crate) fn sanitize_error_message(text: &str, api_key: &str) -> String {
    const MAX_LEN: usize = 500;

    let mut text = text.trim().to_string();
    if !api_key.is_empty() {
        text = text.replace(api_key, &mask_api_key(api_key));
    }
    if text.chars().count() > MAX_LEN {
        let truncated: String = text.chars().take(MAX_LEN).collect();
        text = format!("{truncated}...");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            GenImgError::MissingArguments { usage: USAGE }.kind(),
            ErrorKind::Argument
        );
        assert_eq!(
            GenImgError::DependencyUnavailable {
                name: "pillow".into(),
                reason: "pip missing".into(),
            }
            .kind(),
            ErrorKind::Dependency
        );
        assert_eq!(GenImgError::Auth("bad".into()).kind(), ErrorKind::Transport);
        assert_eq!(
            GenImgError::Timeout(Duration::from_secs(5)).kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            GenImgError::from(ContentError::NoImageData).kind(),
            ErrorKind::Content
        );
        assert_eq!(
            GenImgError::ContentBlocked("SAFETY".into()).kind(),
            ErrorKind::Content
        );
    }

    #[test]
    fn test_error_display() {
        let err = GenImgError::MissingArguments { usage: USAGE };
        assert_eq!(
            err.to_string(),
            "Missing arguments. Usage: genimg <prompt> <api_key>"
        );

        let err = GenImgError::Api {
            status: 500,
            message: "Internal".into(),
        };
        assert_eq!(err.to_string(), "API error: 500 - Internal");

        let err = GenImgError::from(ContentError::NoImageData);
        assert_eq!(err.to_string(), "No image data in response");
    }

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("AIzaSyExample"), "AIza...");
        assert_eq!(mask_api_key("abc"), "****");
        assert_eq!(mask_api_key(""), "****");
    }

    #[test]
    fn test_sanitize_strips_key_and_truncates() {
        let msg = sanitize_error_message("  key AIzaSecret rejected  ", "AIzaSecret");
        assert_eq!(msg, "key AIza... rejected");

        let long = "x".repeat(600);
        let msg = sanitize_error_message(&long, "");
        assert_eq!(msg.chars().count(), 503);
        assert!(msg.ends_with("..."));
    }
}
