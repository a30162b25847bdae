//! End-to-end tests for the profex binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn profex() -> Command {
    Command::cargo_bin("profex").unwrap()
}

#[test]
fn test_extract_single_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("blocks.json");
    std::fs::write(
        &input,
        r#"[{"text": "TOTAL 1.250,00 EUR", "bbox": [40.0, 400.0, 200.0, 414.0]}]"#,
    )
    .unwrap();

    profex()
        .arg("extract")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""amount": "1250.00""#))
        .stdout(predicate::str::contains(r#""currency": "EUR""#));
}

#[test]
fn test_extract_missing_input() {
    profex()
        .arg("extract")
        .arg("no-such-file.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_extract_text_format() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("blocks.json");
    std::fs::write(&input, "[]").unwrap();

    profex()
        .arg("extract")
        .arg(&input)
        .args(["--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Confidence: 0.00"));
}

#[test]
fn test_batch_no_matches() {
    profex()
        .arg("batch")
        .arg("no-such-dir/*.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn test_config_path() {
    profex()
        .arg("config")
        .args(["path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file"));
}
