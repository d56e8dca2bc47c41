//! Short-lived subprocess execution with a time budget.

use crate::error::{GenImgError, Result};
use serde::Serialize;
use std::ffi::OsStr;
use std::process::Stdio;
use std::time::Duration;

/// A value collected from one external call, or the reason it could not be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Probe<T> {
    /// The call succeeded.
    Ok(T),
    /// The call failed; the error rendered as a string.
    Error(String),
}

impl<T> Probe<T> {
    /// Returns the value, if the call succeeded.
    pub fn ok(&self) -> Option<&T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    /// Returns the error string, if the call failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Ok(_) => None,
            Self::Error(e) => Some(e),
        }
    }
}

impl<T> From<Result<T>> for Probe<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(e) => Self::Error(e.to_string()),
        }
    }
}

/// Runs a program to completion and returns its trimmed output.
///
/// Stdout is preferred; stderr is returned when stdout is empty, since some
/// interpreters print `--version` there. A child still running at `timeout`
/// is killed.
pub async fn run_command<S: AsRef<OsStr>>(
    program: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = S>,
    timeout: Duration,
) -> Result<String> {
    let program = program.as_ref();
    let shown = program.to_string_lossy().into_owned();

    let child = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output();

    let output = tokio::time::timeout(timeout, child)
        .await
        .map_err(|_| GenImgError::Timeout(timeout))??;

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if !output.status.success() {
        tracing::debug!(program = %shown, status = %output.status, "command failed");
        return Err(GenImgError::CommandFailed {
            program: shown,
            status: output.status.to_string(),
            stderr: last_line(&stderr).to_string(),
        });
    }

    Ok(if stdout.is_empty() { stderr } else { stdout })
}

/// Tracebacks end with the line that matters.
fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const TIMEOUT: Duration = Duration::from_secs(10);

    #[test]
    fn test_last_line() {
        let trace = "Traceback (most recent call last):\n  File \"<string>\", line 1\nModuleNotFoundError: No module named 'PIL'\n\n";
        assert_eq!(last_line(trace), "ModuleNotFoundError: No module named 'PIL'");
        assert_eq!(last_line(""), "");
    }

    #[test]
    fn test_probe_from_result() {
        let ok: Probe<String> = Ok("3.12".to_string()).into();
        assert_eq!(ok.ok().map(String::as_str), Some("3.12"));
        assert!(ok.error().is_none());

        let err: Probe<String> = Err(GenImgError::Timeout(TIMEOUT)).into();
        assert!(err.ok().is_none());
        assert_eq!(err.error(), Some("operation timed out after 10s"));
    }

    #[test]
    fn test_probe_serializes_tagged() {
        let ok = serde_json::to_value(Probe::Ok("x".to_string())).unwrap();
        assert_eq!(ok, serde_json::json!({"ok": "x"}));
        let err = serde_json::to_value(Probe::<String>::Error("boom".into())).unwrap();
        assert_eq!(err, serde_json::json!({"error": "boom"}));
    }

    #[tokio::test]
    async fn test_missing_program_is_io_error() {
        let err = run_command("genimg-definitely-not-a-program", ["--version"], TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, GenImgError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_and_failure() {
        let out = run_command("sh", ["-c", "echo '  hello  '"], TIMEOUT).await.unwrap();
        assert_eq!(out, "hello");

        let out = run_command("sh", ["-c", "echo 'Python 2.7.18' >&2"], TIMEOUT)
            .await
            .unwrap();
        assert_eq!(out, "Python 2.7.18");

        let err = run_command("sh", ["-c", "echo first >&2; echo 'last words' >&2; exit 3"], TIMEOUT)
            .await
            .unwrap_err();
        match err {
            GenImgError::CommandFailed { program, stderr, .. } => {
                assert_eq!(program, "sh");
                assert_eq!(stderr, "last words");
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout() {
        let err = run_command("sh", ["-c", "sleep 5"], Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, GenImgError::Timeout(_)));
    }
}
