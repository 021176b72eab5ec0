//! Corruption recovery tests for the rhythm binary.
//!
//! These tests verify the system can handle:
//! - Corrupted history files
//! - Corrupted playlist files
//! - Files holding the wrong JSON shape
//! - A data directory that cannot be written

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rhythm"));
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_corrupted_history_file() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let history_path = data_dir.join("workout_history_v1.json");
    fs::write(&history_path, "{ invalid json }}}}").expect("Failed to write corrupted history");

    cli(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Today: 0s"));

    cli(data_dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No workouts yet"));

    // The next completion replaces the unreadable list
    cli(data_dir)
        .args(["play", "sample-easy-5min", "--auto-complete"])
        .assert()
        .success();

    let contents = fs::read_to_string(&history_path).expect("Failed to read history");
    let history: serde_json::Value =
        serde_json::from_str(&contents).expect("History should be valid JSON again");
    assert_eq!(history.as_array().map(|h| h.len()), Some(1));
}

#[test]
fn test_history_with_wrong_shape() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(
        data_dir.join("workout_history_v1.json"),
        r#"{"playlist_id": "not-a-list"}"#,
    )
    .expect("Failed to write history");

    cli(data_dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No workouts yet"));
}

#[test]
fn test_corrupted_playlist_file() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("custom_playlists_v1.json"), "[{\"id\": tru")
        .expect("Failed to write corrupted playlists");

    // Samples remain available
    cli(data_dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("sample-easy-5min"));

    cli(data_dir)
        .args(["new", "--from", "sample-easy-5min", "--name", "Recovered"])
        .assert()
        .success();

    cli(data_dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Recovered"));
}

#[test]
fn test_empty_files() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("custom_playlists_v1.json"), "").unwrap();
    fs::write(data_dir.join("workout_history_v1.json"), "").unwrap();

    cli(data_dir).arg("list").assert().success();
    cli(data_dir).arg("history").assert().success();
    cli(data_dir).arg("home").assert().success();
}

#[test]
fn test_unwritable_data_dir_does_not_fail_workout() {
    let temp_dir = setup_test_dir();
    let blocker = temp_dir.path().join("not-a-dir");
    fs::write(&blocker, "file in the way").unwrap();

    // History cannot be saved, but finishing the workout still succeeds
    Command::new(assert_cmd::cargo::cargo_bin!("rhythm"))
        .env("XDG_CONFIG_HOME", temp_dir.path().join("config"))
        .arg("--data-dir")
        .arg(&blocker)
        .args(["play", "sample-easy-5min", "--auto-complete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout complete"));
}
