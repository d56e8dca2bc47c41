//! Dependency resolution: probe, and when allowed, install once and probe again.

use crate::error::{GenImgError, Result};
use async_trait::async_trait;
use serde::Serialize;

/// How a dependency ended up after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyStatus {
    /// Present on the first probe.
    Available,
    /// Missing at first, present after one install attempt.
    MissingAndInstalled,
    /// Missing, and either installation was not allowed or did not help.
    MissingAndUnavailable,
}

/// Whether a missing dependency may be installed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InstallPolicy {
    /// Report missing dependencies as unavailable.
    #[default]
    Never,
    /// Try one installation, then probe once more.
    Attempt,
}

/// Outcome of resolving one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Dependency name.
    pub name: String,
    /// Final status.
    pub status: DependencyStatus,
    /// Reported version, when the dependency exposes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Why the dependency is unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Resolution {
    /// Returns true if the dependency can be used.
    pub fn is_usable(&self) -> bool {
        self.status != DependencyStatus::MissingAndUnavailable
    }

    /// Fails with [`GenImgError::DependencyUnavailable`] unless usable.
    pub fn require(&self) -> Result<()> {
        if self.is_usable() {
            return Ok(());
        }
        Err(GenImgError::DependencyUnavailable {
            name: self.name.clone(),
            reason: self
                .error
                .clone()
                .unwrap_or_else(|| "not installed".into()),
        })
    }
}

/// Something the program needs at runtime that may be absent.
#[async_trait]
pub trait Dependency: Send + Sync {
    /// Returns the dependency name for reporting.
    fn name(&self) -> &str;

    /// Checks presence. `Ok` carries the version if one is known.
    async fn probe(&self) -> Result<Option<String>>;

    /// Attempts to make the dependency present.
    async fn install(&self) -> Result<()>;
}

/// Resolves a dependency under the given install policy.
pub async fn resolve(dep: &dyn Dependency, policy: InstallPolicy) -> Resolution {
    let name = dep.name().to_string();

    let probe_error = match dep.probe().await {
        Ok(version) => {
            tracing::debug!(dependency = %name, ?version, "dependency available");
            return Resolution {
                name,
                status: DependencyStatus::Available,
                version,
                error: None,
            };
        }
        Err(e) => e,
    };

    if policy == InstallPolicy::Never {
        tracing::debug!(dependency = %name, "dependency missing: {probe_error}");
        return unavailable(name, probe_error);
    }

    tracing::warn!(dependency = %name, "dependency missing, attempting install: {probe_error}");
    if let Err(e) = dep.install().await {
        tracing::error!(dependency = %name, "install failed: {e}");
        return unavailable(name, e);
    }

    match dep.probe().await {
        Ok(version) => {
            tracing::info!(dependency = %name, ?version, "dependency available after install");
            Resolution {
                name,
                status: DependencyStatus::MissingAndInstalled,
                version,
                error: None,
            }
        }
        Err(e) => {
            tracing::error!(dependency = %name, "still missing after install: {e}");
            unavailable(name, e)
        }
    }
}

fn unavailable(name: String, err: GenImgError) -> Resolution {
    Resolution {
        name,
        status: DependencyStatus::MissingAndUnavailable,
        version: None,
        error: Some(err.to_string()),
    }
}

/// A component compiled into the binary; always present.
#[derive(Debug, Clone, Copy)]
pub struct BuiltIn {
    name: &'static str,
    version: &'static str,
}

impl BuiltIn {
    /// Creates a built-in dependency.
    pub const fn new(name: &'static str, version: &'static str) -> Self {
        Self { name, version }
    }

    /// The Gemini REST client shipped with this crate.
    pub const fn gemini_client() -> Self {
        Self::new("gemini-rest-client", env!("CARGO_PKG_VERSION"))
    }
}

#[async_trait]
impl Dependency for BuiltIn {
    fn name(&self) -> &str {
        self.name
    }

    async fn probe(&self) -> Result<Option<String>> {
        Ok(Some(self.version.to_string()))
    }

    async fn install(&self) -> Result<()> {
        Ok(())
    }
}
