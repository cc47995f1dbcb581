//! Argument handling that does not need a repository.

use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn patchport(home: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("patchport"));
    cmd.env("HOME", home.path())
        .env("USERPROFILE", home.path())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_flags_and_deploy() {
    let home = TempDir::new().expect("home");
    patchport(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--commit"))
        .stdout(contains("--origin"))
        .stdout(contains("deploy"));
}

#[test]
fn unknown_origin_is_rejected_by_parser() {
    let home = TempDir::new().expect("home");
    patchport(&home)
        .args(["--origin", "staging", "--commit", "abc123"])
        .assert()
        .failure()
        .stderr(contains("unknown environment 'staging'"));
}

#[test]
fn deploy_develop_is_refused_before_any_git_call() {
    let home = TempDir::new().expect("home");
    let repo = TempDir::new().expect("repo");
    patchport(&home)
        .args(["deploy", "develop", "--skip-auth-check", "--repo"])
        .arg(repo.path())
        .assert()
        .failure()
        .stderr(contains("cannot deploy to 'develop'"));
}

#[test]
fn deploy_rejects_malformed_date() {
    let home = TempDir::new().expect("home");
    patchport(&home)
        .args(["deploy", "qa", "--date", "02/01/2024"])
        .assert()
        .failure()
        .stderr(contains("--date"));
}

#[test]
fn patch_flags_do_not_mix_with_deploy() {
    let home = TempDir::new().expect("home");
    patchport(&home)
        .args(["--commit", "abc123", "deploy", "qa"])
        .assert()
        .failure();
}

#[test]
fn malformed_config_is_reported_with_path() {
    let home = TempDir::new().expect("home");
    let repo = TempDir::new().expect("repo");
    std::fs::write(repo.path().join(".patchport.yaml"), "log_depth: [not a number\n")
        .expect("write config");
    patchport(&home)
        .args(["deploy", "qa", "--skip-auth-check", "--repo"])
        .arg(repo.path())
        .assert()
        .failure()
        .stderr(contains(".patchport.yaml"));
}
