//! Gemini (Google) generative-content provider.

use crate::error::{sanitize_error_message, ContentError, GenImgError, Result};
use crate::image::provider::ImageProvider;
use crate::image::types::{ContentPart, GenerationRequest, InlineImage, Modality};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-preview-image-generation";

/// Public Generative Language API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Finish reasons that mean the candidate was withheld.
const BLOCKED_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "IMAGE_SAFETY",
    "IMAGE_PROHIBITED_CONTENT",
    "IMAGE_RECITATION",
    "RECITATION",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
];

/// Builder for GeminiProvider.
#[derive(Debug, Clone)]
pub struct GeminiProviderBuilder {
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl Default for GeminiProviderBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl GeminiProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the API root, e.g. for a proxy.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the whole-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the provider, resolving the API key.
    pub fn build(self) -> Result<GeminiProvider> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GenImgError::Auth("no API key provided".into()))?;

        let client = reqwest::Client::builder().timeout(self.timeout).build()?;

        Ok(GeminiProvider {
            client,
            api_key,
            model: self.model,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            timeout: self.timeout,
        })
    }
}

/// Gemini generative-content provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiProvider {
    /// Creates a new `GeminiProviderBuilder`.
    pub fn builder() -> GeminiProviderBuilder {
        GeminiProviderBuilder::new()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn generate_impl(&self, request: &GenerationRequest) -> Result<Vec<ContentPart>> {
        let start = Instant::now();
        let body = GeminiRequest::from_generation_request(request);

        tracing::info!(model = %self.model, "sending request to Gemini API");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenImgError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenImgError::from_reqwest(e, self.timeout))?;

        tracing::info!(
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "received response from Gemini API"
        );

        if !status.is_success() {
            return Err(self.parse_error(status.as_u16(), &text));
        }

        parse_response(&text)
    }

    fn parse_error(&self, status: u16, text: &str) -> GenImgError {
        let message = serde_json::from_str::<GeminiErrorEnvelope>(text)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| text.to_string());
        let message = sanitize_error_message(&message, &self.api_key);

        match status {
            401 | 403 => GenImgError::Auth(message),
            _ => GenImgError::Api { status, message },
        }
    }
}

#[async_trait]
impl ImageProvider for GeminiProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<ContentPart>> {
        self.generate_impl(request).await
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }
}

/// Turns a 2xx response body into ordered content parts.
fn parse_response(body: &str) -> Result<Vec<ContentPart>> {
    if body.trim().is_empty() {
        return Err(ContentError::EmptyResponse.into());
    }

    let response: GeminiResponse = serde_json::from_str(body)?;

    // Prompt-level blocks come back as HTTP 200
    if let Some(feedback) = response.prompt_feedback {
        if let Some(reason) = feedback.block_reason {
            let msg = feedback
                .block_reason_message
                .unwrap_or_else(|| format!("Prompt blocked: {reason}"));
            return Err(GenImgError::ContentBlocked(msg));
        }
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(ContentError::NoCandidates)?;

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    if parts.is_empty() {
        if let Some(reason) = candidate
            .finish_reason
            .filter(|r| BLOCKED_FINISH_REASONS.contains(&r.as_str()))
        {
            return Err(GenImgError::ContentBlocked(format!(
                "Content blocked by Gemini safety filter: {reason}"
            )));
        }
        return Err(ContentError::NoContentParts.into());
    }

    tracing::debug!(count = parts.len(), "processing content parts");

    let mut out = Vec::with_capacity(parts.len());
    for part in parts {
        if let Some(text) = part.text {
            out.push(ContentPart::Text(text));
        } else if let Some(inline) = part.inline_data {
            let data = base64::engine::general_purpose::STANDARD
                .decode(inline.data.as_bytes())
                .map_err(|e| GenImgError::Decode(e.to_string()))?;
            out.push(ContentPart::InlineData(InlineImage::new(inline.mime_type, data)));
        }
    }
    Ok(out)
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<Modality>,
}

impl GeminiRequest {
    fn from_generation_request(req: &GenerationRequest) -> Self {
        let mut parts = vec![GeminiRequestPart::Text {
            text: req.prompt.clone(),
        }];

        // The image to restyle follows the instruction
        if let Some(image) = &req.input_image {
            parts.push(GeminiRequestPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.to_base64(),
                },
            });
        }

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: req.modalities.clone(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, alias = "inline_data")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(alias = "mime_type")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}
