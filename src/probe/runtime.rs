//! Process and platform metadata.

use crate::error::GenImgError;
use crate::probe::command::Probe;
use serde::Serialize;
use std::collections::BTreeMap;

/// Environment variable name prefixes worth reporting.
pub const ENV_PREFIXES: &[&str] = &["PYTHON", "PATH", "VIRTUAL_ENV"];

/// Metadata about the running process.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeInfo {
    /// Version of this crate.
    pub genimg_version: String,
    /// `<os>-<arch> (<family>)`.
    pub platform: String,
    /// Path of the running executable.
    pub executable: Probe<String>,
    /// Working directory.
    pub current_dir: Probe<String>,
    /// Environment variables matching [`ENV_PREFIXES`].
    pub env_vars: BTreeMap<String, String>,
}

impl RuntimeInfo {
    /// Reads the current process's metadata.
    pub fn collect() -> Self {
        Self {
            genimg_version: env!("CARGO_PKG_VERSION").to_string(),
            platform: platform(),
            executable: Probe::from(
                std::env::current_exe()
                    .map(|p| p.display().to_string())
                    .map_err(GenImgError::from),
            ),
            current_dir: Probe::from(
                std::env::current_dir()
                    .map(|p| p.display().to_string())
                    .map_err(GenImgError::from),
            ),
            env_vars: filter_env_vars(
                std::env::vars_os().map(|(k, v)| {
                    (
                        k.to_string_lossy().into_owned(),
                        v.to_string_lossy().into_owned(),
                    )
                }),
                ENV_PREFIXES,
            ),
        }
    }
}

/// Returns the compile-target platform string.
pub fn platform() -> String {
    format!(
        "{}-{} ({})",
        std::env::consts::OS,
        std::env::consts::ARCH,
        std::env::consts::FAMILY
    )
}

/// Keeps only the variables whose names start with one of `prefixes`.
pub fn filter_env_vars(
    vars: impl IntoIterator<Item = (String, String)>,
    prefixes: &[&str],
) -> BTreeMap<String, String> {
    vars.into_iter()
        .filter(|(name, _)| prefixes.iter().any(|p| name.starts_with(p)))
        .collect()
}
