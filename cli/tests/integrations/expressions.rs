use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_cli_simplify() {
    let mut cmd = Command::cargo_bin("equate").unwrap();
    cmd.arg("simplify").arg("(x + 1)^2");

    cmd.assert()
        .success()
        .stdout(predicate::str::diff("x^2 + 2*x + 1\n"));
}

#[test]
fn test_cli_simplify_parse_error() {
    let mut cmd = Command::cargo_bin("equate").unwrap();
    cmd.arg("simplify").arg("2 + * 3");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Parse error"));
}

#[test]
fn test_cli_eval_with_bindings() {
    let mut cmd = Command::cargo_bin("equate").unwrap();
    cmd.arg("eval").arg("x^2 + y").arg("x=3").arg("y=-1");

    cmd.assert().success().stdout(predicate::str::diff("8\n"));
}

#[test]
fn test_cli_eval_undefined_variable() {
    let mut cmd = Command::cargo_bin("equate").unwrap();
    cmd.arg("eval").arg("x + z").arg("x=1");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("undefined variable 'z'"));
}

#[test]
fn test_cli_eval_bad_binding() {
    let mut cmd = Command::cargo_bin("equate").unwrap();
    cmd.arg("eval").arg("x").arg("x=abc");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("value must be an integer"));
}
