//! Binary-level checks of argument handling.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_flags() {
    Command::cargo_bin("switch_selection_release")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--keep-target"))
        .stdout(predicate::str::contains("--library-prefix"));
}

#[test]
fn missing_project_dir_exits_with_usage_error() {
    Command::cargo_bin("switch_selection_release")
        .unwrap()
        .args(["--project-dir", "/definitely/not/a/project", "--no-color"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Project directory does not exist"));
}

#[test]
fn invalid_prefix_exits_with_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("switch_selection_release")
        .unwrap()
        .arg("-C")
        .arg(dir.path())
        .args(["--library-prefix", "BAD-PREFIX"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid library prefix"));
}
