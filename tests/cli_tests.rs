//! Integration tests for the `dodctl` CLI binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn dodctl_cmd() -> Command {
    Command::cargo_bin("dodctl").unwrap()
}

#[test]
fn cli_help_command() {
    let mut cmd = dodctl_cmd();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Definition-of-Done"))
        .stdout(predicate::str::contains("automate-complete"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("Commands:"));
}

#[test]
fn cli_version_command() {
    let mut cmd = dodctl_cmd();
    cmd.arg("--version");

    cmd.assert().success().stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn automate_complete_rejects_unknown_criterion() {
    let dir = tempdir().unwrap();
    let mut cmd = dodctl_cmd();
    cmd.args(["--root", dir.path().to_str().unwrap(), "automate-complete", "--criteria", "teleportation"]);

    cmd.assert().failure().code(2);
}

#[test]
fn validate_on_empty_project_exits_zero() {
    let dir = tempdir().unwrap();
    let mut cmd = dodctl_cmd();
    cmd.args(["--root", dir.path().to_str().unwrap(), "validate"]);

    // `validate` is informational: it always exits 0 unless an internal
    // error occurs, regardless of whether criteria pass.
    cmd.assert().success();
}

#[test]
fn status_reports_every_registered_criterion() {
    let dir = tempdir().unwrap();
    let mut cmd = dodctl_cmd();
    cmd.args(["--root", dir.path().to_str().unwrap(), "status"]);

    cmd.assert().success().stdout(predicate::str::contains("testing")).stdout(predicate::str::contains("security"));
}

#[test]
fn exoskeleton_init_then_rerun_without_force_conflicts() {
    let dir = tempdir().unwrap();

    let mut first = dodctl_cmd();
    first.args(["--root", dir.path().to_str().unwrap(), "exoskeleton", "init"]);
    first.assert().success();

    assert!(dir.path().join(".uvmgr/exoskeleton/config.yaml").exists());

    fs::write(dir.path().join(".uvmgr/exoskeleton/config.yaml"), "tampered: true\n").unwrap();

    let mut second = dodctl_cmd();
    second.args(["--root", dir.path().to_str().unwrap(), "exoskeleton", "init"]);
    second.assert().failure().code(1);
}

#[test]
fn exoskeleton_init_preview_writes_nothing() {
    let dir = tempdir().unwrap();
    let mut cmd = dodctl_cmd();
    cmd.args(["--root", dir.path().to_str().unwrap(), "exoskeleton", "init", "--preview"]);

    cmd.assert().success();
    assert!(!dir.path().join(".uvmgr/exoskeleton/config.yaml").exists());
}

#[test]
fn pipeline_generate_writes_github_manifest() {
    let dir = tempdir().unwrap();
    let mut cmd = dodctl_cmd();
    cmd.args(["--root", dir.path().to_str().unwrap(), "pipeline", "generate", "--provider", "github"]);

    cmd.assert().success();
    let manifest = fs::read_to_string(dir.path().join(".github/workflows/dod.yml")).unwrap();
    assert!(manifest.contains("dodctl automate-complete"));
}

#[test]
fn pipeline_generate_rejects_unknown_provider() {
    let dir = tempdir().unwrap();
    let mut cmd = dodctl_cmd();
    cmd.args(["--root", dir.path().to_str().unwrap(), "pipeline", "generate", "--provider", "jenkins"]);

    cmd.assert().failure();
}
