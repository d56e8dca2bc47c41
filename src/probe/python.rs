//! Python interpreter and package checks.

use crate::deps::Dependency;
use crate::error::Result;
use crate::probe::command::run_command;
use async_trait::async_trait;
use std::time::Duration;

/// Install runs get this many times the normal subprocess budget.
const INSTALL_TIMEOUT_FACTOR: u32 = 10;

/// Imports a module by name and prints its `__version__`, if any.
const IMPORT_SCRIPT: &str = "import importlib, sys\n\
m = importlib.import_module(sys.argv[1])\n\
print(getattr(m, '__version__', ''))";

/// A Python package checked by importing it through an interpreter.
#[derive(Debug, Clone)]
pub struct PythonPackage {
    name: String,
    module: String,
    interpreter: String,
    timeout: Duration,
}

impl PythonPackage {
    /// Creates a package check. `name` is the pip distribution name.
    pub fn new(
        name: impl Into<String>,
        module: impl Into<String>,
        interpreter: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            interpreter: interpreter.into(),
            timeout,
        }
    }

    /// The packages the image scripts of a Python deployment rely on.
    pub fn defaults(interpreter: &str, timeout: Duration) -> Vec<Self> {
        vec![
            Self::new("google-generativeai", "google.generativeai", interpreter, timeout),
            Self::new("pillow", "PIL", interpreter, timeout),
        ]
    }
}

#[async_trait]
impl Dependency for PythonPackage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn probe(&self) -> Result<Option<String>> {
        let version = run_command(
            &self.interpreter,
            ["-c", IMPORT_SCRIPT, self.module.as_str()],
            self.timeout,
        )
        .await?;
        Ok(Some(version).filter(|v| !v.is_empty()))
    }

    async fn install(&self) -> Result<()> {
        tracing::info!(package = %self.name, "installing with pip");
        run_command(
            &self.interpreter,
            ["-m", "pip", "install", self.name.as_str(), "--upgrade"],
            self.timeout * INSTALL_TIMEOUT_FACTOR,
        )
        .await?;
        Ok(())
    }
}

/// Returns `<interpreter> --version`.
pub async fn python_version(interpreter: &str, timeout: Duration) -> Result<String> {
    run_command(interpreter, ["--version"], timeout).await
}

/// Returns `<interpreter> -m pip list`.
pub async fn pip_list(interpreter: &str, timeout: Duration) -> Result<String> {
    run_command(interpreter, ["-m", "pip", "list"], timeout).await
}

/// Locates `python` or `python3` on `PATH` through the shell.
pub async fn which_python(timeout: Duration) -> Result<String> {
    run_command(
        "sh",
        ["-c", "which python || which python3 || echo 'Not found'"],
        timeout,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps::{resolve, DependencyStatus, InstallPolicy};

    const TIMEOUT: Duration = Duration::from_secs(10);
    const MISSING: &str = "/nonexistent/genimg-test/python";

    #[test]
    fn test_defaults() {
        let packages = PythonPackage::defaults("python3", TIMEOUT);
        let names: Vec<&str> = packages.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["google-generativeai", "pillow"]);
        assert_eq!(packages[1].module, "PIL");
    }

    #[tokio::test]
    async fn test_missing_interpreter() {
        assert!(python_version(MISSING, TIMEOUT).await.is_err());
        assert!(pip_list(MISSING, TIMEOUT).await.is_err());

        let pkg = PythonPackage::new("pillow", "PIL", MISSING, TIMEOUT);
        let res = resolve(&pkg, InstallPolicy::Attempt).await;
        assert_eq!(res.status, DependencyStatus::MissingAndUnavailable);
        assert!(res.error.is_some());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_which_python_always_answers() {
        // The shell fallback prints "Not found" rather than failing.
        let out = which_python(TIMEOUT).await.unwrap();
        assert!(!out.is_empty());
    }
}
