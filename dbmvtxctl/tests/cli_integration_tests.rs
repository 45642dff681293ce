//! Integration tests for the dbmvtxctl binary
//!
//! These run the built binary without a daemon, covering argument handling,
//! completion output and failures that must not need a server.

use std::process::{Command, Output};

fn dbmvtxctl(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dbmvtxctl"))
        .args(["--no-config"])
        .args(args)
        .env_remove("DBMVTX_SERVER")
        .env_remove("DBMVTX_FORMAT")
        .env_remove("DBMVTX_TIMEOUT")
        .output()
        .expect("failed to run dbmvtxctl")
}

#[test]
fn test_completion_script() {
    let output = dbmvtxctl(&["completion", "bash"]);
    assert!(output.status.success());

    let script = String::from_utf8_lossy(&output.stdout);
    assert!(script.contains("dbmvtxctl"));
    assert!(script.contains("watchdog"));
}

#[test]
fn test_invalid_format_is_rejected() {
    let output = dbmvtxctl(&["--format", "xml", "info"]);
    assert!(!output.status.success());
}

#[test]
fn test_invalid_server_url() {
    let output = dbmvtxctl(&["--server", "localhost:9180", "info"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("http://"));
}

#[test]
fn test_watchdog_timeout_checked_before_request() {
    let output = dbmvtxctl(&["--server", "http://127.0.0.1:1", "watchdog", "arm", "400"]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("0-340"));
}

#[test]
fn test_health_reports_unreachable_server() {
    let output = dbmvtxctl(&[
        "--server",
        "http://127.0.0.1:1",
        "--format",
        "json",
        "health",
    ]);
    assert!(output.status.success());

    let health: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(health["connected"], false);
}
