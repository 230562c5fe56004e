//! Process-level behavior: exit codes, output destinations, config files.

mod common;

use assert_cmd::Command;
use common::{clean_corpus, faulty_corpus};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn tempograph() -> Command {
    let mut cmd = Command::cargo_bin("tempograph").unwrap();
    cmd.env("TEMPOGRAPH_QUIET", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_graph_json_to_stdout() {
    let dir = clean_corpus();
    tempograph()
        .args(["analyze", dir.path().to_str().unwrap()])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"OrderWorkflow\""))
        .stdout(predicate::str::contains("\"total_nodes\": 4"));
}

#[test]
fn test_lint_exit_codes() {
    let clean = clean_corpus();
    tempograph()
        .args(["analyze", clean.path().to_str().unwrap(), "--lint"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("warning[TA031]"));

    tempograph()
        .args(["analyze", clean.path().to_str().unwrap(), "--lint", "--strict"])
        .assert()
        .code(1);

    let faulty = faulty_corpus();
    tempograph()
        .args(["analyze", faulty.path().to_str().unwrap(), "--lint", "--no-color"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("error[TA002]"))
        .stdout(predicate::str::contains("2 error(s)"));
}

#[test]
fn test_disabled_rules_change_verdict() {
    let faulty = faulty_corpus();
    tempograph()
        .args([
            "analyze",
            faulty.path().to_str().unwrap(),
            "--lint",
            "--disable",
            "TA002,argument-mismatch",
        ])
        .assert()
        .code(0);
}

#[test]
fn test_missing_path_is_an_error() {
    let dir = TempDir::new().unwrap();
    tempograph()
        .args(["analyze", dir.path().join("nope").to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_unknown_rule_is_an_error() {
    let dir = clean_corpus();
    tempograph()
        .args(["analyze", dir.path().to_str().unwrap(), "--lint", "--enable", "TA999"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown rule 'TA999'"));
}

#[test]
fn test_output_directory_must_exist() {
    let dir = clean_corpus();
    let output = dir.path().join("missing").join("graph.json");
    tempograph()
        .args(["analyze", dir.path().to_str().unwrap(), "-o", output.to_str().unwrap()])
        .assert()
        .code(2);
    assert!(!output.exists());
}

#[test]
fn test_graph_format_written_to_file() {
    let dir = clean_corpus();
    let out = TempDir::new().unwrap();
    let output = out.path().join("graph.mmd");
    tempograph()
        .args([
            "analyze",
            dir.path().to_str().unwrap(),
            "--format",
            "mermaid",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("flowchart LR"));
}

#[test]
fn test_multiple_lint_formats_use_derived_paths() {
    let dir = faulty_corpus();
    let out = TempDir::new().unwrap();
    let report = out.path().join("report.txt");
    tempograph()
        .args([
            "analyze",
            dir.path().to_str().unwrap(),
            "--lint",
            "--lint-format",
            "text,sarif,checkstyle",
            "-o",
            report.to_str().unwrap(),
        ])
        .assert()
        .code(1);

    assert!(fs::read_to_string(&report).unwrap().contains("error[TA040]"));
    let sarif = fs::read_to_string(out.path().join("report.sarif")).unwrap();
    assert!(sarif.contains("\"version\": \"2.1.0\""));
    let checkstyle = fs::read_to_string(out.path().join("report.xml")).unwrap();
    assert!(checkstyle.contains("source=\"tempograph.TA002\""));
}

#[test]
fn test_config_file_thresholds_apply() {
    let dir = faulty_corpus();
    fs::write(
        dir.path().join(".tempograph.toml"),
        "[lint]\ndisable = [\"TA002\", \"TA040\"]\n",
    )
    .unwrap();
    tempograph()
        .args(["analyze", dir.path().to_str().unwrap(), "--lint"])
        .assert()
        .code(0);
}

#[test]
fn test_init_writes_config_once() {
    let dir = TempDir::new().unwrap();
    tempograph()
        .arg("init")
        .current_dir(dir.path())
        .assert()
        .code(0)
        .stdout(predicate::str::contains(".tempograph.toml"));
    assert!(dir.path().join(".tempograph.toml").exists());

    tempograph()
        .arg("init")
        .current_dir(dir.path())
        .assert()
        .code(2);

    tempograph()
        .args(["init", "--force"])
        .current_dir(dir.path())
        .assert()
        .code(0);
}
