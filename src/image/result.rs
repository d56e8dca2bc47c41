//! The JSON record printed by the requestor.

use crate::deps::Resolution;
use crate::error::{ContentError, GenImgError};
use crate::image::types::Generation;
use crate::probe::RuntimeInfo;
use serde::{Deserialize, Serialize};

/// Diagnostic metadata attached on request.
#[derive(Debug, Clone, Serialize)]
pub struct DebugInfo {
    /// Process and platform information.
    pub runtime: RuntimeInfo,
    /// Resolution of the API client dependency.
    pub client: Resolution,
}

/// Outcome of a single image request, as printed on stdout.
///
/// `success` is true exactly when `image_data` is present. A response that
/// carries only text is still a failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationResult {
    /// True iff `image_data` is present.
    pub success: bool,
    /// Human-readable failure description.
    pub error: Option<String>,
    /// Accompanying text returned by the API.
    pub text: Option<String>,
    /// Standard base64 of the raw image bytes.
    pub image_data: Option<String>,
    /// MIME type of the image.
    pub mime_type: Option<String>,
    /// Diagnostic metadata, only when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<serde_json::Value>,
}

impl GenerationResult {
    /// Builds the result for a completed call.
    pub fn from_generation(generation: Generation) -> Self {
        let mut result = Self {
            text: generation.text,
            ..Self::default()
        };

        match generation.image {
            Some(image) => {
                result.image_data = Some(image.to_base64());
                result.mime_type = Some(image.mime_type);
                result.success = true;
            }
            None => {
                result.error = Some(ContentError::NoImageData.to_string());
            }
        }
        result
    }

    /// Builds the result for a failed call.
    pub fn from_error(err: &GenImgError) -> Self {
        Self {
            error: Some(err.to_string()),
            ..Self::default()
        }
    }

    /// Attaches diagnostic metadata.
    pub fn with_debug_info(mut self, info: &DebugInfo) -> Self {
        match serde_json::to_value(info) {
            Ok(value) => self.debug_info = Some(value),
            Err(e) => tracing::warn!("failed to serialize debug info: {e}"),
        }
        self
    }

    /// Serializes to a single-line JSON document.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<crate::Result<Generation>> for GenerationResult {
    fn from(outcome: crate::Result<Generation>) -> Self {
        match outcome {
            Ok(generation) => Self::from_generation(generation),
            Err(e) => Self::from_error(&e),
        }
    }
}
