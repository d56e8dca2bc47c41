//! One prompt in, one [`GenerationResult`] out.
//!
//! Argument validation happens before any client exists, so a short argument
//! list never reaches the network. Every failure after that is folded into
//! the result's `error` field.

use crate::deps::{resolve, BuiltIn, Dependency, InstallPolicy, Resolution};
use crate::error::{mask_api_key, GenImgError, Result, USAGE};
use crate::image::providers::{GeminiProvider, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::image::{
    load_input_image, DebugInfo, Generation, GenerationRequest, GenerationResult, ImageProvider,
};
use crate::probe::RuntimeInfo;
use std::time::Duration;

/// Characters of the prompt shown in logs.
const PROMPT_PREVIEW_CHARS: usize = 30;

/// Validated positional arguments.
#[derive(Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Prompt sent to the API.
    pub prompt: String,
    /// API key the client is scoped to.
    pub api_key: String,
}

impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("prompt", &self.prompt)
            .field("api_key", &mask_api_key(&self.api_key))
            .finish()
    }
}

impl Invocation {
    /// Takes the prompt and API key from positional arguments.
    ///
    /// Arguments after the second are ignored.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let [prompt, api_key, rest @ ..] = args else {
            return Err(GenImgError::MissingArguments { usage: USAGE });
        };
        if !rest.is_empty() {
            tracing::warn!(count = rest.len(), "ignoring extra arguments");
        }

        let (prompt, api_key) = (prompt.as_ref(), api_key.as_ref());
        if prompt.trim().is_empty() {
            return Err(GenImgError::InvalidArguments("prompt is empty".into()));
        }
        if api_key.trim().is_empty() {
            return Err(GenImgError::InvalidArguments("API key is empty".into()));
        }

        Ok(Self {
            prompt: prompt.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

/// Client settings that do not come from positional arguments.
#[derive(Debug, Clone)]
pub struct RequestorConfig {
    /// Gemini model identifier.
    pub model: String,
    /// API root.
    pub base_url: String,
    /// Whole-request timeout, also applied to fetching the input image.
    pub timeout: Duration,
    /// URL or path of an image to restyle.
    pub input_image: Option<String>,
    /// Attach [`DebugInfo`] to the result.
    pub debug_info: bool,
}

impl Default for RequestorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
            input_image: None,
            debug_info: false,
        }
    }
}

/// Drives a single request against a provider built from the API key.
#[derive(Debug, Clone, Default)]
pub struct ImageRequestor {
    config: RequestorConfig,
}

impl ImageRequestor {
    /// Creates a requestor with the given settings.
    pub fn new(config: RequestorConfig) -> Self {
        Self { config }
    }

    /// Runs against the Gemini API.
    pub async fn run<S: AsRef<str>>(&self, args: &[S]) -> GenerationResult {
        self.run_with(args, &BuiltIn::gemini_client(), |api_key| {
            GeminiProvider::builder()
                .api_key(api_key)
                .model(self.config.model.as_str())
                .base_url(self.config.base_url.as_str())
                .timeout(self.config.timeout)
                .build()
        })
        .await
    }

    /// Runs against a provider produced by `connect`.
    ///
    /// `connect` is only called once the arguments are valid and `client`
    /// resolved as usable.
    pub async fn run_with<S, F, P>(
        &self,
        args: &[S],
        client: &dyn Dependency,
        connect: F,
    ) -> GenerationResult
    where
        S: AsRef<str>,
        F: FnOnce(&str) -> Result<P>,
        P: ImageProvider,
    {
        let resolution = resolve(client, InstallPolicy::Never).await;
        let outcome = self.request(args, &resolution, connect).await;

        match &outcome {
            Ok(generation) if generation.has_image() => {
                tracing::info!("image generation successful");
            }
            Ok(_) => tracing::warn!("no image data found in response"),
            Err(e) => tracing::error!(kind = ?e.kind(), "{e}"),
        }

        let result = GenerationResult::from(outcome);
        if self.config.debug_info {
            result.with_debug_info(&DebugInfo {
                runtime: RuntimeInfo::collect(),
                client: resolution,
            })
        } else {
            result
        }
    }

    /// Validates arguments, connects, and submits one request.
    async fn request<S, F, P>(
        &self,
        args: &[S],
        client: &Resolution,
        connect: F,
    ) -> Result<Generation>
    where
        S: AsRef<str>,
        F: FnOnce(&str) -> Result<P>,
        P: ImageProvider,
    {
        let invocation = Invocation::from_args(args)?;
        tracing::info!(
            prompt = %preview(&invocation.prompt),
            api_key = %mask_api_key(&invocation.api_key),
            "starting image generation"
        );

        client.require()?;
        let provider = connect(&invocation.api_key)?;
        tracing::debug!(provider = provider.name(), model = provider.model(), "client ready");

        let mut request = GenerationRequest::new(invocation.prompt);
        if let Some(location) = &self.config.input_image {
            tracing::info!(%location, "using input image for style transfer");
            let image = load_input_image(location, self.config.timeout).await?;
            request = request.with_input_image(image);
        }

        let parts = provider.generate(&request).await?;
        Ok(Generation::from_parts(parts))
    }
}

fn preview(prompt: &str) -> String {
    let mut chars = prompt.chars();
    let head: String = chars.by_ref().take(PROMPT_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
