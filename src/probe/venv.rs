//! Virtual-environment directory checks.

use crate::probe::command::{run_command, Probe};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directories checked by default, relative to the working directory.
pub const VENV_CANDIDATES: &[&str] = &[".venv", "./.venv", "/app/.venv"];

/// Result of checking one candidate directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenvCheck {
    /// Candidate path as configured.
    pub path: String,
    /// Whether the directory exists.
    pub exists: bool,
    /// Interpreter check, only for existing directories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<InterpreterCheck>,
}

/// Result of checking the interpreter inside a virtual environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterpreterCheck {
    /// Interpreter path, relative to the candidate.
    pub path: String,
    /// Whether the interpreter exists.
    pub exists: bool,
    /// `--version` output, only for existing interpreters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Probe<String>>,
}

/// Returns the interpreter location inside a virtual environment.
pub fn interpreter_path(venv: &Path) -> PathBuf {
    if cfg!(windows) {
        venv.join("Scripts").join("python.exe")
    } else {
        venv.join("bin").join("python")
    }
}

/// Checks one candidate, resolving relative paths against `base`.
pub async fn check_venv(base: &Path, candidate: &str, timeout: Duration) -> VenvCheck {
    let dir = base.join(candidate);
    if !dir.exists() {
        return VenvCheck {
            path: candidate.to_string(),
            exists: false,
            interpreter: None,
        };
    }

    let interpreter = interpreter_path(&dir);
    let exists = interpreter.exists();
    let version = if exists {
        Some(Probe::from(
            run_command(&interpreter, ["--version"], timeout).await,
        ))
    } else {
        None
    };

    VenvCheck {
        path: candidate.to_string(),
        exists: true,
        interpreter: Some(InterpreterCheck {
            path: interpreter_path(Path::new(candidate)).display().to_string(),
            exists,
            version,
        }),
    }
}

/// Checks every candidate in order.
pub async fn check_venvs(base: &Path, candidates: &[&str], timeout: Duration) -> Vec<VenvCheck> {
    let mut checks = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        checks.push(check_venv(base, candidate, timeout).await);
    }
    checks
}

/// Renders the human-readable check section.
pub fn render_venv_section(checks: &[VenvCheck]) -> String {
    let mut out = String::from("Checking virtual environment directories:\n");
    for check in checks {
        if !check.exists {
            let _ = writeln!(out, "✗ {} does not exist", check.path);
            continue;
        }
        let _ = writeln!(out, "✓ {} exists", check.path);

        let Some(interp) = &check.interpreter else {
            continue;
        };
        if !interp.exists {
            let _ = writeln!(out, "  ✗ {} does not exist", interp.path);
            continue;
        }
        let _ = writeln!(out, "  ✓ {} exists", interp.path);
        match &interp.version {
            Some(Probe::Ok(version)) => {
                let _ = writeln!(out, "  ✓ Version: {version}");
            }
            Some(Probe::Error(e)) => {
                let _ = writeln!(out, "  ✗ Error getting version: {e}");
            }
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(10);
    const LOCAL_CANDIDATES: &[&str] = &[".venv", "./.venv", "srv/app/.venv"];

    #[tokio::test]
    async fn test_none_exist() {
        let dir = tempfile::tempdir().unwrap();
        let checks = check_venvs(dir.path(), LOCAL_CANDIDATES, TIMEOUT).await;

        assert_eq!(checks.len(), 3);
        assert!(checks.iter().all(|c| !c.exists && c.interpreter.is_none()));

        let text = render_venv_section(&checks);
        assert_eq!(text.matches("does not exist").count(), 3);
        assert!(text.contains("✗ .venv does not exist"));
        assert!(text.contains("✗ srv/app/.venv does not exist"));
        assert!(!text.contains("Version"));

        let json = serde_json::to_string(&checks).unwrap();
        assert!(!json.contains("interpreter"));
        assert!(!json.contains("version"));
    }

    #[tokio::test]
    async fn test_venv_without_interpreter() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".venv")).unwrap();

        let check = check_venv(dir.path(), ".venv", TIMEOUT).await;
        assert!(check.exists);
        let interp = check.interpreter.as_ref().unwrap();
        assert!(!interp.exists);
        assert!(interp.version.is_none());

        let text = render_venv_section(&[check]);
        assert!(text.contains("✓ .venv exists"));
        assert!(text.contains("  ✗ "));
        assert!(text.contains("does not exist"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_venv_with_interpreter() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join(".venv").join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let python = bin.join("python");
        std::fs::write(&python, "#!/bin/sh\necho 'Python 3.11.4'\n").unwrap();
        std::fs::set_permissions(&python, std::fs::Permissions::from_mode(0o755)).unwrap();

        let checks = check_venvs(dir.path(), &[".venv", "./.venv"], TIMEOUT).await;
        for check in &checks {
            let interp = check.interpreter.as_ref().unwrap();
            assert!(interp.exists);
            assert_eq!(interp.version, Some(Probe::Ok("Python 3.11.4".into())));
        }
        assert_eq!(checks[0].interpreter.as_ref().unwrap().path, ".venv/bin/python");

        let text = render_venv_section(&checks);
        assert!(text.contains("  ✓ .venv/bin/python exists"));
        assert!(text.contains("  ✓ Version: Python 3.11.4"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_broken_interpreter_reports_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join(".venv").join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let python = bin.join("python");
        std::fs::write(&python, "#!/bin/sh\necho 'broken' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&python, std::fs::Permissions::from_mode(0o755)).unwrap();

        let check = check_venv(dir.path(), ".venv", TIMEOUT).await;
        let text = render_venv_section(&[check]);
        assert!(text.contains("  ✗ Error getting version:"));
        assert!(text.contains("broken"));
    }
}
