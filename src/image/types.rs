//! Core types for image generation.

use serde::{Deserialize, Serialize};

/// Content kinds the API may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    /// Text fragments.
    Text,
    /// Inline image data.
    Image,
}

impl Modality {
    /// Returns the wire name (e.g. "IMAGE").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Image => "IMAGE",
        }
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to generate an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The text prompt describing the desired image.
    pub prompt: String,
    /// Response modalities to request. Defaults to text and image.
    pub modalities: Vec<Modality>,
    /// Image to restyle, sent alongside the prompt.
    #[serde(skip)]
    pub input_image: Option<InlineImage>,
}

impl GenerationRequest {
    /// Creates a new request with the given prompt, asking for text and image.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            modalities: vec![Modality::Text, Modality::Image],
            input_image: None,
        }
    }

    /// Overrides the requested response modalities.
    pub fn with_modalities(mut self, modalities: impl Into<Vec<Modality>>) -> Self {
        self.modalities = modalities.into();
        self
    }

    /// Attaches an input image for style transfer.
    pub fn with_input_image(mut self, image: InlineImage) -> Self {
        self.input_image = Some(image);
        self
    }
}

/// Raw image bytes with their declared MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// MIME type as declared by the API, e.g. "image/png".
    pub mime_type: String,
    /// Decoded image bytes.
    pub data: Vec<u8>,
}

impl InlineImage {
    /// Creates an inline image.
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Encodes the image data as standard base64.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Guesses an image MIME type from its leading bytes.
pub fn sniff_mime_type(data: &[u8]) -> Option<&'static str> {
    match data {
        [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ => None,
    }
}

/// One fragment of a generated response, in the order the API returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    /// A text fragment.
    Text(String),
    /// Binary content with a MIME type.
    InlineData(InlineImage),
}

/// The folded outcome of a completed call.
///
/// Later parts overwrite earlier ones of the same kind, so a response with
/// several images keeps only the last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use = "a generation should be turned into a result or inspected"]
pub struct Generation {
    /// Last text fragment seen.
    pub text: Option<String>,
    /// Last inline image seen.
    pub image: Option<InlineImage>,
}

impl Generation {
    /// Folds response parts in iteration order.
    pub fn from_parts(parts: impl IntoIterator<Item = ContentPart>) -> Self {
        let mut generation = Self::default();
        for part in parts {
            match part {
                ContentPart::Text(text) => {
                    tracing::debug!(chars = text.chars().count(), "found text part");
                    generation.text = Some(text);
                }
                ContentPart::InlineData(image) => {
                    tracing::debug!(
                        mime_type = %image.mime_type,
                        size_bytes = image.size(),
                        "found inline image part"
                    );
                    generation.image = Some(image);
                }
            }
        }
        generation
    }

    /// Returns true when an image was produced.
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}
