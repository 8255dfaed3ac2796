use assert_cmd::Command;
use predicates::prelude::*;

fn grade_json(args: &[&str]) -> serde_json::Value {
    let mut cmd = Command::cargo_bin("equate").unwrap();
    cmd.arg("grade").args(args).arg("--json");

    let output = cmd.output().unwrap();
    assert!(output.status.success(), "{:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_cli_grade_with_hints() {
    let result = grade_json(&["4", "--expected", "4", "--hints", "2"]);
    assert_eq!(result["score"], 0.8);
    assert_eq!(result["mastery"], "high");
}

#[test]
fn test_cli_grade_with_attempts() {
    let result = grade_json(&["x", "--expected", "x", "--attempts", "5"]);
    assert_eq!(result["score"], 0.9);
}

#[test]
fn test_cli_grade_missing_expected() {
    let result = grade_json(&["x"]);
    assert_eq!(result["score"], 0.0);
    assert_eq!(result["reason"], "No expected answer provided for grading");
}

#[test]
fn test_cli_grade_missing_student() {
    let result = grade_json(&["--expected", "x"]);
    assert_eq!(result["reason"], "No student answer provided");
}

#[test]
fn test_cli_grade_extracts_answer() {
    let result = grade_json(&[
        "First expand, so the answer is 2x + 2.",
        "--expected",
        "2(x + 1)",
        "--extract",
    ]);
    assert_eq!(result["score"], 1.0);
}

#[test]
fn test_cli_grade_table_output() {
    let mut cmd = Command::cargo_bin("equate").unwrap();
    cmd.arg("grade").arg("2x + 2").arg("-e").arg("2(x + 1)");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Score"))
        .stdout(predicate::str::contains("1.00"))
        .stdout(predicate::str::contains("high"));
}
