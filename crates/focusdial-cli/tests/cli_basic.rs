//! CLI end-to-end tests.
//!
//! Each test runs the compiled binary against its own temporary data
//! directory, so invocations share state only through the SQLite file.

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

fn cli(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("focusdial-cli").unwrap();
    cmd.env("FOCUSDIAL_DATA_DIR", dir.path()).env_remove("RUST_LOG");
    cmd
}

fn json(dir: &TempDir, args: &[&str]) -> Value {
    let output = cli(dir).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_status_starts_idle() {
    let dir = TempDir::new().unwrap();
    let status = json(&dir, &["session", "status"]);
    assert_eq!(status["phase"], "idle");
    assert_eq!(status["isRunning"], false);
}

#[test]
fn test_activate_start_pause_persist_between_runs() {
    let dir = TempDir::new().unwrap();

    let status = json(&dir, &["session", "activate"]);
    assert_eq!(status["phase"], "work");
    assert_eq!(status["remainingSeconds"], 1500);
    assert_eq!(status["remainingDisplay"], "25:00");

    let status = json(&dir, &["session", "start"]);
    assert_eq!(status["isRunning"], true);

    let status = json(&dir, &["session", "pause"]);
    assert_eq!(status["isRunning"], false);
    assert_eq!(status["phase"], "work");

    let status = json(&dir, &["session", "status"]);
    assert_eq!(status["phase"], "work");
    assert_eq!(status["isRunning"], false);
}

#[test]
fn test_deactivate_returns_previous_timer() {
    let dir = TempDir::new().unwrap();
    json(
        &dir,
        &["session", "activate", "--hours", "1", "--minutes", "5"],
    );

    let previous = json(&dir, &["session", "deactivate"]);
    assert_eq!(previous["hours"], 1);
    assert_eq!(previous["minutes"], 5);

    let status = json(&dir, &["session", "status"]);
    assert_eq!(status["phase"], "idle");
}

#[test]
fn test_start_requires_session_mode() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .args(["session", "start"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_settings_set_keeps_omitted_fields() {
    let dir = TempDir::new().unwrap();
    let config = json(&dir, &["settings", "set", "--cycles", "2"]);
    assert_eq!(config["workSeconds"], 1500);
    assert_eq!(config["cyclesBeforeLongBreak"], 2);

    let config = json(&dir, &["settings", "set", "--minutes", "50"]);
    assert_eq!(config["workSeconds"], 3000);
    assert_eq!(config["cyclesBeforeLongBreak"], 2);

    let config = json(&dir, &["settings", "show"]);
    assert_eq!(config["workSeconds"], 3000);
}

#[test]
fn test_settings_bad_input_falls_back_to_default() {
    let dir = TempDir::new().unwrap();
    let config = json(
        &dir,
        &["settings", "set", "--hours", "x", "--minutes", "y", "--short-break", "0"],
    );
    assert_eq!(config["workSeconds"], 1500);
    assert_eq!(config["shortBreakSeconds"], 300);
}

#[test]
fn test_settings_change_resets_current_work_phase() {
    let dir = TempDir::new().unwrap();
    json(&dir, &["session", "activate"]);
    json(&dir, &["settings", "set", "--minutes", "10"]);
    let status = json(&dir, &["session", "status"]);
    assert_eq!(status["remainingSeconds"], 600);
    assert_eq!(status["totalSeconds"], 600);
}

#[test]
fn test_config_set_get_and_reset() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .args(["config", "set", "engine.tick_period_ms", "250"])
        .assert()
        .success();
    let output = cli(&dir)
        .args(["config", "get", "engine.tick_period_ms"])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "250");

    cli(&dir)
        .args(["config", "set", "engine.tick_period_ms", "0"])
        .assert()
        .failure();
    cli(&dir).args(["config", "get", "nope"]).assert().failure();

    cli(&dir).args(["config", "reset"]).assert().success();
    let output = cli(&dir).args(["config", "list"]).output().unwrap();
    let listed = String::from_utf8_lossy(&output.stdout);
    assert!(listed.contains("tick_period_ms = 1000"), "{listed}");

    let output = cli(&dir).args(["config", "path"]).output().unwrap();
    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    assert_eq!(path, dir.path().join("config.toml").display().to_string());
}

#[cfg(unix)]
#[test]
fn test_run_pauses_on_interrupt() {
    use std::time::Duration;

    let dir = TempDir::new().unwrap();
    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("focusdial-cli"))
        .env("FOCUSDIAL_DATA_DIR", dir.path())
        .env_remove("RUST_LOG")
        .args(["session", "run"])
        .stdout(std::process::Stdio::null())
        .spawn()
        .unwrap();
    std::thread::sleep(Duration::from_millis(1500));

    let killed = std::process::Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(killed.success());
    assert!(child.wait().unwrap().success());

    let status = json(&dir, &["session", "status"]);
    assert_eq!(status["phase"], "work");
    assert_eq!(status["isRunning"], false);
}

#[test]
fn test_stats_empty_history() {
    let dir = TempDir::new().unwrap();
    let summary = json(&dir, &["stats", "all"]);
    assert_eq!(summary["work_sessions"], 0);
    let recent = json(&dir, &["stats", "recent"]);
    assert_eq!(recent, Value::Array(vec![]));
}
