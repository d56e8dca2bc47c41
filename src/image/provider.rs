//! Image provider trait.

use crate::error::Result;
use crate::image::types::{ContentPart, GenerationRequest};
use async_trait::async_trait;

/// A generative-content backend that can answer with text and images.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Submits one request and returns the response parts in API order.
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<ContentPart>>;

    /// Returns the model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str;
}
