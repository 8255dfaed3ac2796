use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_cli_check_equivalent() {
    let mut cmd = Command::cargo_bin("equate").unwrap();
    cmd.arg("check").arg("x+1").arg("1+x");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("yes"))
        .stdout(predicate::str::contains("Canonical forms match"));
}

#[test]
fn test_cli_check_json() {
    let mut cmd = Command::cargo_bin("equate").unwrap();
    cmd.arg("check").arg("5").arg("4").arg("--json");

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let verdict: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(verdict["is_equivalent"], false);
    assert_eq!(verdict["confidence"], "low");
    assert_eq!(verdict["reason"], "Numeric values differ");
}

#[test]
fn test_cli_check_without_canonical_stage() {
    let mut cmd = Command::cargo_bin("equate").unwrap();
    cmd.arg("check")
        .arg("x+1")
        .arg("1+x")
        .arg("--no-canonical")
        .arg("--seed")
        .arg("7");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("All numeric substitution checks passed"));
}

#[test]
fn test_cli_check_seed_is_reproducible() {
    let run = || {
        let mut cmd = Command::cargo_bin("equate").unwrap();
        cmd.arg("check")
            .arg("(x^2 - 1)/(x - 1)")
            .arg("x + 1")
            .arg("--seed")
            .arg("42")
            .arg("--json");
        cmd.output().unwrap().stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn test_cli_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("equate.json");
    fs::write(&config, r#"{"equivalence": {"canonical_form": false}}"#).unwrap();

    let mut cmd = Command::cargo_bin("equate").unwrap();
    cmd.arg("--config").arg(&config).arg("check").arg("x+1").arg("1+x");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("All numeric substitution checks passed"));
}

#[test]
fn test_cli_config_from_environment() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("equate.json");
    fs::write(&config, r#"{"equivalence": {"canonical_form": false}}"#).unwrap();

    let mut cmd = Command::cargo_bin("equate").unwrap();
    cmd.env("EQUATE_CONFIG", &config)
        .arg("check")
        .arg("x+1")
        .arg("1+x");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("All numeric substitution checks passed"));
}

#[test]
fn test_cli_invalid_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("equate.json");
    fs::write(&config, r#"{"equivalence": {"trials": 0}}"#).unwrap();

    let mut cmd = Command::cargo_bin("equate").unwrap();
    cmd.arg("--config").arg(&config).arg("check").arg("x").arg("x");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("trials must be at least 1"));
}
