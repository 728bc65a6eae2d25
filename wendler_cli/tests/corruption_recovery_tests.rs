//! Corruption recovery tests for the wendler binary.
//!
//! These tests verify the system can handle:
//! - Corrupted profile and accessory files
//! - Corrupted session log lines
//! - Unknown stored codes
//! - Concurrent session logging

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write as IoWrite;
use std::path::Path;
use std::thread;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("wendler"));
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn session_lines(data_dir: &Path) -> usize {
    fs::read_to_string(data_dir.join("sessions.jsonl"))
        .unwrap_or_default()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count()
}

#[test]
fn test_corrupted_profile_falls_back_to_defaults() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    fs::write(data_dir.join("profile.json"), "{ invalid json }}}}").unwrap();

    cli(data_dir)
        .args(["now", "--auto-complete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Session logged"));

    // The next save replaces the corrupted file with a valid profile
    let contents = fs::read_to_string(data_dir.join("profile.json")).unwrap();
    let profile: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(profile["training_max_percentage"], 0.9);
}

#[test]
fn test_corrupted_session_lines_ignored() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    fs::write(data_dir.join("sessions.jsonl"), "{ invalid json }\n{ more invalid }\n").unwrap();

    // Nothing parseable, so the rotation starts over at squat
    cli(data_dir)
        .args(["now", "--auto-complete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SQUAT"));

    cli(data_dir)
        .args(["history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Squat"));
}

#[test]
fn test_partial_session_line_does_not_block_rotation() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir).args(["now", "--auto-complete"]).assert().success();

    // Simulate a crash mid-append
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(data_dir.join("sessions.jsonl"))
        .unwrap();
    write!(file, "{{\"id\":\"trunc").unwrap();
    drop(file);

    cli(data_dir)
        .args(["now", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BENCH PRESS"));
}

#[test]
fn test_unknown_codes_decode_to_defaults() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    fs::write(
        data_dir.join("profile.json"),
        r#"{"squat_one_rep_max":300,"bench_one_rep_max":200,"deadlift_one_rep_max":400,
           "ohp_one_rep_max":120,"training_max_percentage":0.9,"current_cycle":1,
           "current_week":1,"selected_template":99}"#,
    )
    .unwrap();
    fs::write(
        data_dir.join("sessions.jsonl"),
        r#"{"id":"7d3f1c1e-9a47-4d6a-8a0b-0c1f2e3d4a5b","date":"2024-01-01T00:00:00Z","main_lift":42,"week":1,"cycle":1,"is_completed":true,"amrap_reps":0,"amrap_weight":0.0}
"#,
    )
    .unwrap();

    // Unknown lift code reads as squat, so bench is next
    cli(data_dir)
        .args(["now", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BENCH PRESS"))
        .stdout(predicate::str::contains("First Set Last"));
}

#[test]
fn test_corrupted_accessories_treated_as_empty() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    fs::write(data_dir.join("accessories.json"), "not json at all").unwrap();

    cli(data_dir)
        .args(["accessory", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No accessories yet"));

    cli(data_dir)
        .args(["now", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Accessories").not());
}

#[test]
fn test_concurrent_session_logging() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let data_dir = data_dir.clone();
            thread::spawn(move || {
                cli(&data_dir)
                    .args(["now", "--auto-complete"])
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    // Every append landed as a whole line
    assert_eq!(session_lines(&data_dir), 4);
    let contents = fs::read_to_string(data_dir.join("sessions.jsonl")).unwrap();
    for line in contents.lines() {
        serde_json::from_str::<serde_json::Value>(line).expect("Interleaved write");
    }
}
