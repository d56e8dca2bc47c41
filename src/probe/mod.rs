//! Deployment environment probe.
//!
//! Collects process, platform and Python-deployment facts into an
//! [`EnvironmentReport`]. Every external call is made separately, and a
//! failing call only degrades its own field to an error string.
//!
//! ```no_run
//! use genimg::probe::{EnvironmentProbe, ProbeConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> genimg::Result<()> {
//!     let report = EnvironmentProbe::new(ProbeConfig::default()).collect().await;
//!     println!("{}", report.to_json_pretty()?);
//!     println!("\n{}", report.render_venv_section());
//!     Ok(())
//! }
//! ```

mod command;
mod python;
mod runtime;
mod venv;

pub use command::{run_command, Probe};
pub use python::{pip_list, python_version, which_python, PythonPackage};
pub use runtime::{filter_env_vars, platform, RuntimeInfo, ENV_PREFIXES};
pub use venv::{
    check_venv, check_venvs, interpreter_path, render_venv_section, InterpreterCheck, VenvCheck,
    VENV_CANDIDATES,
};

use crate::deps::{resolve, InstallPolicy, Resolution};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Interpreter probed when none is configured.
pub const DEFAULT_PYTHON: &str = "python3";

/// Reported when `VIRTUAL_ENV` is unset.
const NO_VIRTUAL_ENV: &str = "Not in a virtual environment";

/// Settings for one probe run.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Interpreter used for version, pip and import checks.
    pub python: String,
    /// Whether missing packages may be installed.
    pub install_policy: InstallPolicy,
    /// Budget for each subprocess.
    pub timeout: Duration,
    /// Directory relative candidates are resolved against.
    pub base_dir: PathBuf,
    /// Virtual-environment directories to check.
    pub venv_candidates: Vec<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            python: DEFAULT_PYTHON.to_string(),
            install_policy: InstallPolicy::Never,
            timeout: Duration::from_secs(30),
            base_dir: PathBuf::from("."),
            venv_candidates: VENV_CANDIDATES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Everything the probe learned, ready to print.
#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentReport {
    /// Process and platform metadata.
    #[serde(flatten)]
    pub runtime: RuntimeInfo,
    /// Interpreter that was probed.
    pub python: String,
    /// Its `--version` output.
    pub python_version: Probe<String>,
    /// Its `pip list` output.
    pub pip_list: Probe<String>,
    /// Active virtual environment.
    pub virtual_env: String,
    /// Where `python` resolves on `PATH`.
    pub which_python: Probe<String>,
    /// Optional package resolutions.
    pub dependencies: Vec<Resolution>,
    /// Virtual-environment directory checks.
    pub venv_checks: Vec<VenvCheck>,
}

impl EnvironmentReport {
    /// Serializes as indented JSON.
    pub fn to_json_pretty(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Renders the human-readable virtual-environment section.
    pub fn render_venv_section(&self) -> String {
        render_venv_section(&self.venv_checks)
    }
}

/// Sequential collector for an [`EnvironmentReport`].
#[derive(Debug, Clone, Default)]
pub struct EnvironmentProbe {
    config: ProbeConfig,
}

impl EnvironmentProbe {
    /// Creates a probe with the given settings.
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    /// Runs every check in order.
    pub async fn collect(&self) -> EnvironmentReport {
        let cfg = &self.config;
        tracing::info!(python = %cfg.python, "collecting environment report");

        let runtime = RuntimeInfo::collect();
        let python_version: Probe<String> = python_version(&cfg.python, cfg.timeout).await.into();
        let pip_list: Probe<String> = pip_list(&cfg.python, cfg.timeout).await.into();
        let virtual_env = std::env::var("VIRTUAL_ENV").unwrap_or_else(|_| NO_VIRTUAL_ENV.into());
        let which_python: Probe<String> = which_python(cfg.timeout).await.into();

        let mut dependencies = Vec::new();
        for package in PythonPackage::defaults(&cfg.python, cfg.timeout) {
            dependencies.push(resolve(&package, cfg.install_policy).await);
        }

        let candidates: Vec<&str> = cfg.venv_candidates.iter().map(String::as_str).collect();
        let venv_checks = check_venvs(&cfg.base_dir, &candidates, cfg.timeout).await;

        EnvironmentReport {
            runtime,
            python: cfg.python.clone(),
            python_version,
            pip_list,
            virtual_env,
            which_python,
            dependencies,
            venv_checks,
        }
    }
}
