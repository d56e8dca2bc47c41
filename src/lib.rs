#![warn(missing_docs)]
//! genimg - Gemini image requests and deployment diagnostics.
//!
//! This crate backs two command-line tools:
//!
//! - `genimg <prompt> <api_key>` asks Gemini for an image and prints one
//!   JSON [`GenerationResult`]. Failures are reported in the JSON, never
//!   through the exit code.
//! - `genimg-probe` prints an [`EnvironmentReport`] describing the process,
//!   the Python interpreter, optional packages and virtual environments.
//!
//! # Quick Start
//!
//! ```no_run
//! use genimg::{ImageRequestor, RequestorConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> genimg::Result<()> {
//!     let requestor = ImageRequestor::new(RequestorConfig::default());
//!     let result = requestor.run(&["A golden retriever puppy", "AIza..."]).await;
//!     println!("{}", result.to_json()?);
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `genimg` and `genimg-probe` binaries

pub mod deps;
mod error;
pub mod image;
pub mod probe;
pub mod requestor;

// Re-export error types at crate root
pub use error::{mask_api_key, ContentError, ErrorKind, GenImgError, Result, USAGE};

pub use deps::{DependencyStatus, InstallPolicy, Resolution};
pub use image::providers::{GeminiProvider, GeminiProviderBuilder};
pub use image::{
    ContentPart, DebugInfo, Generation, GenerationRequest, GenerationResult, ImageProvider,
    InlineImage, Modality,
};
pub use probe::{EnvironmentProbe, EnvironmentReport, ProbeConfig};
pub use requestor::{ImageRequestor, Invocation, RequestorConfig};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{GenImgError, Result};
    pub use crate::image::{GenerationRequest, GenerationResult, ImageProvider};
    pub use crate::probe::{EnvironmentProbe, ProbeConfig};
    pub use crate::requestor::{ImageRequestor, RequestorConfig};
}
