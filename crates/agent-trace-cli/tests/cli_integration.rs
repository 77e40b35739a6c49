//! Integration tests for the trace-viz CLI.
//!
//! Only the non-interactive commands are exercised; launching the viewer
//! needs a display.
//!
//! Run with: `cargo test --package agent-trace-cli --test cli_integration`

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Run trace-viz with an isolated home and config directory.
fn run_trace_viz(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_trace-viz"))
        .current_dir(home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("TRACE_VIZ_WS_URL")
        .env_remove("TRACE_VIZ_DARK_MODE")
        .env_remove("TRACE_VIZ_WINDOW_WIDTH")
        .env_remove("TRACE_VIZ_WINDOW_HEIGHT")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute trace-viz command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_help_lists_options() {
    let temp = TempDir::new().unwrap();
    let output = run_trace_viz(temp.path(), &["--help"]);

    assert!(output.status.success(), "trace-viz --help should succeed");
    let text = stdout(&output);
    assert!(text.contains("--url"), "help should mention --url");
    assert!(text.contains("--demo"), "help should mention --demo");
    assert!(text.contains("config"), "help should list the config command");
}

#[test]
fn test_config_path_is_under_config_home() {
    let temp = TempDir::new().unwrap();
    let output = run_trace_viz(temp.path(), &["config", "path"]);

    assert!(output.status.success(), "trace-viz config path should succeed");
    let text = stdout(&output);
    assert!(text.contains("trace-viz"), "path should name the app: {text}");
    assert!(text.trim_end().ends_with("config.json"));
}

#[test]
fn test_config_show_defaults() {
    let temp = TempDir::new().unwrap();
    let output = run_trace_viz(temp.path(), &["config", "show"]);

    assert!(output.status.success(), "trace-viz config show should succeed");
    let text = stdout(&output);
    assert!(text.contains("ws://127.0.0.1:8000/ws"), "should show default URL: {text}");
    assert!(text.contains("1400x900"));
}

#[test]
fn test_config_set_url_persists() {
    let temp = TempDir::new().unwrap();

    let set = run_trace_viz(temp.path(), &["config", "set-url", "wss://trace.example.com/ws"]);
    assert!(set.status.success(), "set-url should succeed");

    let show = run_trace_viz(temp.path(), &["config", "show"]);
    assert!(stdout(&show).contains("wss://trace.example.com/ws"));
}

#[test]
fn test_config_set_url_rejects_http() {
    let temp = TempDir::new().unwrap();
    let output = run_trace_viz(temp.path(), &["config", "set-url", "http://127.0.0.1:8000/ws"]);

    assert!(!output.status.success(), "non-websocket URL should be rejected");
}

#[test]
fn test_env_url_overrides_default() {
    let temp = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_trace-viz"))
        .current_dir(temp.path())
        .env("HOME", temp.path())
        .env("XDG_CONFIG_HOME", temp.path().join(".config"))
        .env("TRACE_VIZ_WS_URL", "ws://from-env:9000/ws")
        .args(["config", "show"])
        .output()
        .expect("Failed to execute trace-viz command");

    assert!(output.status.success());
    assert!(stdout(&output).contains("ws://from-env:9000/ws"));
}
