//! Image generation module.

mod provider;
pub mod providers;
mod result;
mod source;
mod types;

pub use provider::ImageProvider;
pub use result::{DebugInfo, GenerationResult};
pub use source::load_input_image;
pub use types::{
    sniff_mime_type, ContentPart, Generation, GenerationRequest, InlineImage, Modality,
};
