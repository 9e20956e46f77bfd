//! CLI binary smoke tests using assert_cmd.
//!
//! These tests exercise the compiled `catfold` binary: argument parsing,
//! help text, fold creation and per-fold training end-to-end.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("catfold").unwrap()
}

/// 1000 records, 100 positives. `colour` leans towards `red` for positives.
fn write_training_csv(path: &Path) {
    let mut content = String::from("id,colour,shape,target\n");
    for i in 0..1000 {
        let positive = i < 100;
        let colour = if positive != (i % 5 == 0) { "red" } else { "blue" };
        let shape = match i % 3 {
            0 => "square",
            1 => "",
            _ => "circle",
        };
        content.push_str(&format!("{},{},{},{}\n", i, colour, shape, positive as u8));
    }
    fs::write(path, content).unwrap();
}

// ---------------------------------------------------------------------------
// Top-level
// ---------------------------------------------------------------------------

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("folds"))
        .stdout(predicate::str::contains("train"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("catfold"));
}

// ---------------------------------------------------------------------------
// Folds subcommand
// ---------------------------------------------------------------------------

#[test]
fn folds_nonexistent_input_errors() {
    cmd()
        .args(["folds", "/nonexistent/train.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn folds_missing_target_column_errors() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("train.csv");
    fs::write(&input, "id,colour\n1,red\n2,blue\n").unwrap();
    let output = dir.path().join("train_folds.csv");

    cmd()
        .args(["folds", input.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("target"));
    assert!(!output.exists());
}

#[test]
fn folds_writes_default_output_path() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("train.csv");
    write_training_csv(&input);

    cmd()
        .args(["folds", input.to_str().unwrap(), "--seed", "42"])
        .assert()
        .success();

    let written = fs::read_to_string(dir.path().join("train_folds.csv")).unwrap();
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some("id,colour,shape,target,kfold"));
    assert_eq!(lines.count(), 1000);
}

// ---------------------------------------------------------------------------
// Train subcommand
// ---------------------------------------------------------------------------

#[test]
fn train_requires_model() {
    cmd()
        .arg("train")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--model"));
}

#[test]
fn train_unknown_model_errors_before_reading_data() {
    cmd()
        .args([
            "train",
            "--model",
            "svm",
            "--train_data",
            "/nonexistent/train_folds.csv",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Unknown model 'svm'"))
        .stderr(predicate::str::contains("does not exist").not());
}

#[test]
fn train_nonexistent_config_errors() {
    cmd()
        .args(["train", "--model", "rf", "/nonexistent/catfold.json"])
        .assert()
        .failure();
}

#[test]
fn folds_then_train_prints_one_line_per_fold() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("train.csv");
    let folds = dir.path().join("train_folds.csv");
    write_training_csv(&input);

    cmd()
        .args([
            "folds",
            input.to_str().unwrap(),
            "-o",
            folds.to_str().unwrap(),
            "--seed",
            "7",
        ])
        .assert()
        .success();

    let config = dir.path().join("catfold.json");
    fs::write(
        &config,
        format!(
            r#"{{"training_file": {:?}, "models": {{"rf_small": {{"RandomForest": {{"n_estimators": 20, "seed": 1}}}}}}}}"#,
            folds.to_str().unwrap()
        ),
    )
    .unwrap();

    let assert = cmd()
        .args(["train", "--model", "rf_small", config.to_str().unwrap()])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 5);
    for (fold, line) in lines.iter().enumerate() {
        let prefix = format!("Fold = {}, AUC = ", fold);
        assert!(line.starts_with(&prefix), "{}", line);
        let auc: f64 = line[prefix.len()..].parse().unwrap();
        assert!(auc > 0.5 && auc <= 1.0, "{}", auc);
    }
}

#[test]
fn train_with_decision_tree_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("train.csv");
    let folds = dir.path().join("train_folds.csv");
    let report = dir.path().join("report.html");
    write_training_csv(&input);

    cmd()
        .args(["folds", input.to_str().unwrap(), "-o", folds.to_str().unwrap(), "--seed", "3"])
        .assert()
        .success();

    cmd()
        .args([
            "train",
            "--model",
            "decision_tree_gini",
            "--train_data",
            folds.to_str().unwrap(),
            "--report",
            report.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fold = 4, AUC = "));

    let html = fs::read_to_string(&report).unwrap();
    assert!(html.contains("decision_tree_gini"));
}

#[test]
fn train_evaluates_every_fold_in_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("train.csv");
    let folds = dir.path().join("train_folds.csv");
    write_training_csv(&input);

    cmd()
        .args([
            "folds",
            input.to_str().unwrap(),
            "-o",
            folds.to_str().unwrap(),
            "-k",
            "10",
            "--seed",
            "11",
        ])
        .assert()
        .success();

    let assert = cmd()
        .args([
            "train",
            "--model",
            "decision_tree_gini",
            "--train_data",
            folds.to_str().unwrap(),
        ])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 10);
    assert!(lines[9].starts_with("Fold = 9, AUC = "), "{}", lines[9]);
}

#[test]
fn train_rejects_fewer_folds_than_the_file_holds() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("train.csv");
    let folds = dir.path().join("train_folds.csv");
    write_training_csv(&input);

    cmd()
        .args(["folds", input.to_str().unwrap(), "-o", folds.to_str().unwrap(), "-k", "10"])
        .assert()
        .success();

    cmd()
        .args([
            "train",
            "--model",
            "decision_tree_gini",
            "--train_data",
            folds.to_str().unwrap(),
            "--folds",
            "5",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}
