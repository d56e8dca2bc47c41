//! Shell-level contract of the two binaries.
//!
//! None of these reach a real API: every case fails before a request is
//! sent, or is pointed at a closed local port.

use std::process::{Command, Stdio};

fn genimg(args: &[&str]) -> (serde_json::Value, std::process::Output) {
    let output = Command::new(env!("CARGO_BIN_EXE_genimg"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run genimg");
    let stdout = String::from_utf8(output.stdout.clone()).unwrap();
    let json = serde_json::from_str(stdout.trim()).unwrap_or_else(|e| {
        panic!("stdout is not a single JSON document ({e}): {stdout:?}")
    });
    (json, output)
}

#[test]
fn test_no_arguments_reports_json_and_exits_zero() {
    let (json, output) = genimg(&[]);
    assert!(output.status.success());
    assert_eq!(json["success"], false);
    assert_eq!(
        json["error"],
        "Missing arguments. Usage: genimg <prompt> <api_key>"
    );
    assert!(json["image_data"].is_null());
    assert!(json.get("debug_info").is_none());
}

#[test]
fn test_prompt_without_key() {
    let (json, output) = genimg(&["a lighthouse"]);
    assert!(output.status.success());
    assert_eq!(json["success"], false);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Missing arguments"));
}

#[test]
fn test_unknown_flag_is_reported_in_band() {
    let (json, output) = genimg(&["a cat", "AIzaKey", "--no-such-flag"]);
    assert!(output.status.success());
    assert_eq!(json["success"], false);
    assert_eq!(
        json["error"],
        "invalid arguments: unexpected argument '--no-such-flag' found"
    );
}

#[test]
fn test_prompt_starting_with_dash_reaches_transport() {
    let (json, output) = genimg(&[
        "-a moody sky",
        "AIzaKey",
        "--base-url",
        "http://127.0.0.1:9",
        "--timeout-secs",
        "5",
    ]);
    assert!(output.status.success());
    assert_eq!(json["success"], false);
    let error = json["error"].as_str().unwrap();
    assert!(!error.starts_with("invalid arguments"), "{error}");
    assert!(!error.starts_with("Missing arguments"), "{error}");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("-a moody sky"));
    assert!(stderr.contains("AIza..."));
    assert!(!stderr.contains("AIzaKey"));
}

#[test]
fn test_unreadable_input_image_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.png");
    let (json, output) = genimg(&[
        "--image-url",
        missing.to_str().unwrap(),
        "watercolor",
        "AIzaKey",
        "--base-url",
        "http://127.0.0.1:9",
    ]);
    assert!(output.status.success());
    assert_eq!(json["success"], false);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("failed to load input image"));
}

#[test]
fn test_debug_flag_attaches_debug_info() {
    let (json, output) = genimg(&["--debug"]);
    assert!(output.status.success());
    assert_eq!(json["success"], false);
    assert_eq!(json["debug_info"]["client"]["status"], "available");
    assert!(json["debug_info"]["runtime"]["env_vars"].is_object());
}

#[test]
fn test_closed_stdout_still_exits_zero() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_genimg"))
        .args(["--debug"])
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to run genimg");
    drop(child.stdout.take());

    let status = child.wait().unwrap();
    assert!(status.success(), "exited with {status}");
}

#[test]
fn test_progress_goes_to_stderr() {
    let (_, output) = genimg(&["a lighthouse"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Missing arguments"));
}

#[test]
fn test_probe_prints_report_and_venv_section() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_genimg-probe"))
        .args(["--python", "/nonexistent/genimg-test/python", "--timeout-secs", "10"])
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run genimg-probe");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout.clone()).unwrap();
    let (json_part, text_part) = stdout
        .split_once("\nChecking virtual environment directories:\n")
        .expect("venv section missing");

    let json: serde_json::Value = serde_json::from_str(json_part.trim()).unwrap();
    assert_eq!(json["python"], "/nonexistent/genimg-test/python");
    assert!(json["python_version"].get("error").is_some());
    assert_eq!(json["venv_checks"][0]["path"], ".venv");
    assert_eq!(json["venv_checks"][0]["exists"], false);
    assert!(json["venv_checks"][0].get("interpreter").is_none());

    assert!(text_part.contains("✗ .venv does not exist"));
    assert!(text_part.contains("✗ ./.venv does not exist"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("dependency unavailable: pillow"));
}
