//! CLI command integration tests.
//! Each test points `--storage` at its own temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn waypoint(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("waypoint").unwrap();
    cmd.arg("--storage").arg(dir.path().join("store"));
    cmd.env("RUST_LOG", "off");
    cmd
}

fn status_json(dir: &TempDir) -> serde_json::Value {
    let output = waypoint(dir).args(["status", "--json"]).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Config with short delays so real-time commands finish quickly.
fn fast_config(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("fast.json");
    std::fs::write(
        &path,
        r#"{"loading_delay_ms": 10, "content_reveal_delay_ms": 0, "hint_delay_ms": 20, "transition_duration_ms": 20}"#,
    )
    .unwrap();
    path
}

#[test]
fn status_fresh_storage() {
    let dir = TempDir::new().unwrap();
    waypoint(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exploration: 0%"))
        .stdout(predicate::str::contains("Hidden reality: undiscovered"));
}

#[test]
fn view_regions_accumulate() {
    let dir = TempDir::new().unwrap();
    waypoint(&dir).args(["view", "home", "about"]).assert().success();
    waypoint(&dir).args(["view", "about", "contact"]).assert().success();

    let status = status_json(&dir);
    assert_eq!(status["view"]["exploration_percentage"], 30);
    assert_eq!(status["state"]["viewed_regions"].as_array().unwrap().len(), 3);
}

#[test]
fn view_rejects_unknown_region() {
    let dir = TempDir::new().unwrap();
    waypoint(&dir)
        .args(["view", "footer"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown region id"));
}

#[test]
fn complete_case_study() {
    let dir = TempDir::new().unwrap();
    waypoint(&dir)
        .args(["complete", "skillup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8%"));
    waypoint(&dir).args(["complete", "skillup"]).assert().success();

    let status = status_json(&dir);
    assert_eq!(status["state"]["viewed_case_studies"], serde_json::json!(["skillup"]));
}

#[test]
fn end_session_keeps_discovery() {
    let dir = TempDir::new().unwrap();
    let config = fast_config(&dir);
    waypoint(&dir).args(["view", "home"]).assert().success();
    waypoint(&dir)
        .arg("--config")
        .arg(&config)
        .arg("reveal")
        .assert()
        .success()
        .stdout(predicate::str::contains("discovered"));

    waypoint(&dir)
        .arg("end-session")
        .assert()
        .success()
        .stdout(predicate::str::contains("Session ended"));

    let status = status_json(&dir);
    assert_eq!(status["view"]["exploration_percentage"], 15);
    assert_eq!(status["view"]["reality_discovered"], true);
    assert!(status["state"]["viewed_regions"].as_array().unwrap().is_empty());
}

#[test]
fn simulate_dismiss_then_reload() {
    let dir = TempDir::new().unwrap();
    let config = fast_config(&dir);
    waypoint(&dir)
        .arg("--config")
        .arg(&config)
        .arg("simulate")
        .assert()
        .success()
        .stdout(predicate::str::contains("hint-shown"));

    let status = status_json(&dir);
    assert_eq!(status["state"]["hint_already_shown_this_session"], true);

    // Same session: the hint does not come back.
    waypoint(&dir)
        .arg("--config")
        .arg(&config)
        .arg("simulate")
        .assert()
        .success()
        .stdout(predicate::str::contains("hint-shown").not());
}

#[test]
fn simulate_reveal_from_hint() {
    let dir = TempDir::new().unwrap();
    let config = fast_config(&dir);
    waypoint(&dir)
        .arg("--config")
        .arg(&config)
        .args(["simulate", "--on-hint", "reveal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("transition-playing"));

    let status = status_json(&dir);
    assert_eq!(status["view"]["reality_discovered"], true);
    assert_eq!(status["state"]["hint_already_shown_this_session"], false);
}
