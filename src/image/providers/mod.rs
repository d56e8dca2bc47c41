//! Image generation providers.

mod gemini;

pub use gemini::{GeminiProvider, GeminiProviderBuilder, DEFAULT_BASE_URL, DEFAULT_MODEL};
