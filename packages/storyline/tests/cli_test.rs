//! Tests for the `ootp-storyline` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn storyline_cmd() -> Command {
    let mut cmd = Command::cargo_bin("ootp-storyline").unwrap();
    cmd.env_remove("STORYLINE_SCHEMA_PATH");
    cmd
}

#[test]
fn test_list() {
    storyline_cmd()
        .arg("list")
        .arg(fixture_path("storylines.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("contract_holdout"))
        .stdout(predicate::str::contains("Homer Drought"))
        .stdout(predicate::str::contains("draft"))
        .stdout(predicate::str::contains("3 storylines"));
}

#[test]
fn test_check_ok() {
    storyline_cmd()
        .arg("check")
        .arg(fixture_path("storylines.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("3 storylines, 2 complete, 0 link warnings"));
}

#[test]
fn test_check_reports_duplicates() {
    storyline_cmd()
        .arg("check")
        .arg(fixture_path("duplicate_ids.xml"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("rookie_sensation"));
}

#[test]
fn test_search_with_category() {
    storyline_cmd()
        .args(["search"])
        .arg(fixture_path("storylines.xml"))
        .args(["homer", "--category", "heroics"])
        .assert()
        .success()
        .stdout(predicate::str::contains("walkoff_homer"))
        .stdout(predicate::str::contains("homer_drought").not())
        .stdout(predicate::str::contains("1 matches"));
}

#[test]
fn test_analyze_lists_unknown_names() {
    storyline_cmd()
        .arg("analyze")
        .arg(fixture_path("storylines.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("mod_weight"))
        .stdout(predicate::str::contains("mood"))
        .stdout(predicate::str::contains("(not in schema, passed through)"));
}

#[test]
fn test_new_then_delete() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("pack.xml");

    storyline_cmd()
        .arg("new")
        .arg(&file)
        .arg("hot_streak")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));
    let written = fs::read_to_string(&file).unwrap();
    assert!(written.contains(r#"<STORYLINE id="hot_streak""#));

    storyline_cmd()
        .arg("new")
        .arg(&file)
        .arg("hot_streak")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));

    storyline_cmd()
        .arg("delete")
        .arg(&file)
        .arg("hot_streak")
        .assert()
        .success();
    let written = fs::read_to_string(&file).unwrap();
    assert!(!written.contains("hot_streak"));

    storyline_cmd()
        .arg("delete")
        .arg(&file)
        .arg("hot_streak")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_format_to_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("formatted.xml");

    storyline_cmd()
        .arg("format")
        .arg(fixture_path("storylines.xml"))
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved to:"));

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(written.contains("mod_weight=\"0.75\""));
    assert!(written.contains("<EDITOR_NOTES>"));
}

#[test]
fn test_preset_listing() {
    storyline_cmd()
        .args(["preset", "unused.xml", "s", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("minor_injury"));
}
