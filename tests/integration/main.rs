//! Integration tests for the nancy-pack CLI
//!
//! Every host binds `127.0.0.1:0` and every run points at its own config
//! file so nothing depends on the machine's setup.

use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper function to create a nancy-pack command
fn nancy_pack() -> assert_cmd::Command {
    assert_cmd::Command::new(cargo::cargo_bin!("nancy-pack"))
}

/// Write a pack file listening on an ephemeral loopback port
fn loopback_config(temp: &TempDir) -> PathBuf {
    let path = temp.path().join("pack.toml");
    fs::write(
        &path,
        "uris = [\"http://127.0.0.1:0/\"]\n\n[host]\nrewrite_localhost = false\n",
    )
    .unwrap();
    path
}

// =============================================================================
// BASICS
// =============================================================================

#[test]
fn test_version() {
    nancy_pack()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("nancy-pack v{}", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_version_json() {
    nancy_pack()
        .args(["--json", "version"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"version\""));
}

#[test]
fn test_no_args_prints_hint() {
    nancy_pack()
        .assert()
        .success()
        .stdout(predicate::str::contains("nancy-pack --help"));
}

#[test]
fn test_help_mentions_uri_rules() {
    nancy_pack()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Listen URIs must be absolute and end in '/'"));
}

// =============================================================================
// CHECK-URIS
// =============================================================================

#[test]
fn test_check_uris_valid() {
    nancy_pack()
        .args(["check-uris", "http://localhost:8888/", "http://localhost:8888/api/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok       http://localhost:8888/api/"));
}

#[test]
fn test_check_uris_invalid() {
    nancy_pack()
        .args(["check-uris", "http://localhost:8888/", "http://localhost:8888/app"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("invalid  http://localhost:8888/app"))
        .stderr(predicate::str::contains("1 invalid URI(s)"));
}

#[test]
fn test_check_uris_json() {
    let output = nancy_pack()
        .args(["--json", "check-uris", "http://localhost:8888/", "relative/"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["valid"], false);
    assert_eq!(json["uris"][0]["normalized"], "http://localhost:8888/");
    assert!(json["uris"][1]["error"].is_string());
}

#[test]
fn test_check_uris_requires_input() {
    nancy_pack().arg("check-uris").assert().failure();
}

// =============================================================================
// CONFIG
// =============================================================================

#[test]
fn test_config_show_file() {
    let temp = TempDir::new().unwrap();
    let path = loopback_config(&temp);

    nancy_pack()
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("# source:"))
        .stdout(predicate::str::contains("http://127.0.0.1:0/"))
        .stdout(predicate::str::contains("rewrite_localhost = false"));
}

#[test]
fn test_config_show_from_env() {
    let temp = TempDir::new().unwrap();
    let path = loopback_config(&temp);

    nancy_pack()
        .args(["--json", "config", "show"])
        .env("NANCY_PACK_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"source\""))
        .stdout(predicate::str::contains("pack.toml"));
}

#[test]
fn test_config_show_missing_file() {
    let temp = TempDir::new().unwrap();

    nancy_pack()
        .args(["config", "show", "--config"])
        .arg(temp.path().join("nope.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn test_config_init() {
    let temp = TempDir::new().unwrap();

    nancy_pack()
        .args(["config", "init"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created nancy-pack.toml"));

    let content = fs::read_to_string(temp.path().join("nancy-pack.toml")).unwrap();
    assert!(content.contains("http://localhost:8888/"));
    assert!(content.contains("[host]"));

    nancy_pack()
        .args(["config", "init"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists. Use --force to overwrite."));

    nancy_pack()
        .args(["config", "init", "--force"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created nancy-pack.toml"));
}

// =============================================================================
// CONSOLE
// =============================================================================

#[test]
fn test_console_script() {
    let temp = TempDir::new().unwrap();
    let path = loopback_config(&temp);

    nancy_pack()
        .args(["console", "--config"])
        .arg(&path)
        .write_stdin("status\nstart\nstatus\nstop\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("started: no"))
        .stdout(predicate::str::contains("Hosting Nancy at: http://127.0.0.1:0/"))
        .stdout(predicate::str::contains("started: yes"))
        .stdout(predicate::str::contains("config: custom"))
        .stdout(predicate::str::contains("Stopped hosting Nancy"));
}

#[test]
fn test_console_empty_uris() {
    let temp = TempDir::new().unwrap();
    let path = loopback_config(&temp);

    nancy_pack()
        .args(["console", "--config"])
        .arg(&path)
        .write_stdin("uris\nstart\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("NOT hosting Nancy at any URL"))
        .stdout(predicate::str::contains("Stopped hosting Nancy"));
}

#[test]
fn test_console_reports_errors_and_continues() {
    let temp = TempDir::new().unwrap();
    let path = loopback_config(&temp);

    nancy_pack()
        .args(["console", "--config"])
        .arg(&path)
        .write_stdin("launch\nuris http://127.0.0.1:0/app\nstatus\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("error: unknown command 'launch'"))
        .stdout(predicate::str::contains("error: invalid argument"))
        .stdout(predicate::str::contains("uris: http://127.0.0.1:0/"));
}

// =============================================================================
// SERVE
// =============================================================================

#[test]
fn test_serve_until_enter() {
    let temp = TempDir::new().unwrap();
    let path = loopback_config(&temp);

    nancy_pack()
        .args(["serve", "--config"])
        .arg(&path)
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hosting Nancy at: http://127.0.0.1:0/"))
        .stdout(predicate::str::contains("Bound 127.0.0.1:"))
        .stdout(predicate::str::contains("Press Enter to stop"))
        .stdout(predicate::str::contains("Stopped hosting Nancy"));
}

#[test]
fn test_serve_uri_flag_overrides_config() {
    let temp = TempDir::new().unwrap();
    let path = loopback_config(&temp);

    nancy_pack()
        .args(["serve", "--uri", "http://127.0.0.1:0/api/", "--config"])
        .arg(&path)
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hosting Nancy at: http://127.0.0.1:0/api/"))
        .stdout(predicate::str::contains("Hosting Nancy at: http://127.0.0.1:0/\n").not());
}

#[test]
fn test_serve_json() {
    let temp = TempDir::new().unwrap();
    let path = loopback_config(&temp);

    let output = nancy_pack()
        .args(["--json", "serve", "--config"])
        .arg(&path)
        .write_stdin("\n")
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["started"], true);
    assert_eq!(json["waiting"], false);
    assert_eq!(json["uris"][0], "http://127.0.0.1:0/");
    assert_eq!(json["bound"].as_array().map(Vec::len), Some(1));
}

#[test]
fn test_serve_invalid_uri() {
    let temp = TempDir::new().unwrap();
    let path = loopback_config(&temp);

    nancy_pack()
        .args(["serve", "--uri", "http://127.0.0.1:0/app", "--config"])
        .arg(&path)
        .write_stdin("\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid argument"));
}

#[test]
fn test_serve_port_in_use() {
    let temp = TempDir::new().unwrap();
    let path = loopback_config(&temp);
    let blocker = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = blocker.local_addr().unwrap().port();

    nancy_pack()
        .args(["serve", "--uri", &format!("http://127.0.0.1:{port}/"), "--config"])
        .arg(&path)
        .write_stdin("\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to listen on"));
}
