//! CLI integration tests
//!
//! Tests the dojutsu CLI using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;

fn dojutsu() -> Command {
    let mut cmd = Command::cargo_bin("dojutsu")
        .expect("Failed to locate dojutsu binary - ensure it's built before running tests");
    cmd.env_remove("DOJUTSU_SOCKET");
    cmd
}

#[test]
fn test_cli_help() {
    dojutsu()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dojutsu"))
        .stdout(predicate::str::contains("Dojutsu coding-agent daemon"));
}

#[test]
fn test_cli_version() {
    dojutsu()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dojutsu"));
}

#[test]
fn test_cli_skills_help() {
    dojutsu()
        .args(["skills", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("count"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_config_path_honours_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");

    dojutsu()
        .arg("--config")
        .arg(&path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    dojutsu()
        .arg("--config")
        .arg(&path)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(path.exists());

    dojutsu()
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("allpath_runner.sock"));
}

#[test]
fn test_call_without_daemon_fails_with_hint() {
    let dir = tempfile::tempdir().unwrap();

    dojutsu()
        .arg("--socket")
        .arg(dir.path().join("absent.sock"))
        .args(["call", "version"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Is the daemon running?"));
}

#[test]
fn test_failure_is_reported_once() {
    let dir = tempfile::tempdir().unwrap();

    dojutsu()
        .arg("--socket")
        .arg(dir.path().join("absent.sock"))
        .args(["skills", "count"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::function(|err: &str| {
            err.matches("Is the daemon running?").count() == 1
        }))
        .stderr(predicate::str::contains("Counting skills failed"))
        .stderr(predicate::str::contains("Error:").not());
}

#[test]
fn test_socket_from_environment() {
    let dir = tempfile::tempdir().unwrap();

    dojutsu()
        .env("DOJUTSU_SOCKET", dir.path().join("env.sock"))
        .args(["skills", "count"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("env.sock"));
}

#[test]
fn test_unknown_provider_is_rejected() {
    dojutsu()
        .args(["run", "task", "--provider", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();

    dojutsu()
        .arg("--config")
        .arg(dir.path().join("missing.toml"))
        .args(["skills", "count"])
        .assert()
        .failure();
}
