//! `GitCli` against a real scratch repository.
//!
//! Skipped when no `git` binary is on `PATH`.

use std::fs;
use std::path::Path;
use std::process::Command;

use patchport_core::CommitId;
use patchport_exec::{CommandRunner, GitCli, RunMode, SystemRunner, Vcs, VcsError};
use tempfile::TempDir;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn sh(runner: &SystemRunner, args: &[&str]) -> String {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    runner
        .run("git", &args, RunMode::Captured)
        .expect("git setup command")
}

/// A repository with `develop` and `qa`, where `develop` is one commit ahead.
fn scratch_repo(dir: &Path) -> (SystemRunner, String) {
    let runner = SystemRunner::new(dir);
    sh(&runner, &["init", "--quiet"]);
    sh(&runner, &["config", "user.name", "PatchPort Test"]);
    sh(&runner, &["config", "user.email", "patchport@example.test"]);
    sh(&runner, &["config", "commit.gpgsign", "false"]);
    sh(&runner, &["checkout", "-q", "-b", "develop"]);
    fs::write(dir.join("package.json"), "{\"version\": \"1.0.0\"}\n").expect("write");
    sh(&runner, &["add", "package.json"]);
    sh(&runner, &["commit", "-q", "-m", "initial"]);
    sh(&runner, &["branch", "qa"]);
    fs::write(dir.join("feature.txt"), "login\n").expect("write");
    sh(&runner, &["add", "feature.txt"]);
    sh(&runner, &["commit", "-q", "-m", "JIRA-1|feat|Add login (details)"]);
    let head = sh(&runner, &["rev-parse", "HEAD"]);
    (runner, head)
}

#[test]
fn cherry_pick_onto_new_branch() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().expect("tempdir");
    let (runner, head) = scratch_repo(dir.path());
    let mut git = GitCli::new(runner);
    let commit = CommitId::from(head);

    assert_eq!(
        git.commit_title(&commit).expect("title"),
        "JIRA-1|feat|Add login (details)"
    );

    git.checkout("qa").expect("checkout qa");
    git.checkout_new_branch("patch/from-develop-to-qa/add-login", "qa")
        .expect("new branch");
    git.cherry_pick(&commit).expect("cherry-pick");

    let status = git.status().expect("status");
    assert_eq!(
        status.branch.as_deref(),
        Some("patch/from-develop-to-qa/add-login")
    );
    assert!(status.clean);
    assert!(dir.path().join("feature.txt").exists());

    let log = git.log(5).expect("log");
    assert_eq!(log[0].message, "JIRA-1|feat|Add login (details)");
    assert_eq!(log.len(), 2);
}

#[test]
fn unknown_commit_is_an_error() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().expect("tempdir");
    let (runner, _) = scratch_repo(dir.path());
    let mut git = GitCli::new(runner);
    let err = git
        .commit_title(&CommitId::from("0000000000000000000000000000000000000000"))
        .unwrap_err();
    assert!(matches!(err, VcsError::Command { .. }));
}

#[test]
fn option_shaped_commit_is_treated_as_a_revision() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().expect("tempdir");
    let (runner, _) = scratch_repo(dir.path());
    let mut git = GitCli::new(runner);
    let target = dir.path().join("written-by-git.txt");
    let commit = CommitId::from(format!("--output={}", target.display()));

    assert!(git.commit_title(&commit).is_err());
    assert!(git.cherry_pick(&commit).is_err());
    assert!(!target.exists());
}

#[test]
fn keep_ours_merge_leaves_tree_unchanged() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().expect("tempdir");
    let (runner, _) = scratch_repo(dir.path());
    sh(&runner, &["checkout", "-q", "qa"]);
    fs::write(dir.path().join("hotfix.txt"), "qa only\n").expect("write");
    sh(&runner, &["add", "hotfix.txt"]);
    sh(&runner, &["commit", "-q", "-m", "qa hotfix"]);

    let mut git = GitCli::new(runner);
    git.checkout("develop").expect("checkout develop");
    git.checkout_new_branch("release/qa/2024-01-02", "develop")
        .expect("release branch");
    git.merge_ours("qa", "Merging qa into release/qa/2024-01-02 for deployment")
        .expect("merge");

    assert!(!dir.path().join("hotfix.txt").exists());
    assert!(dir.path().join("feature.txt").exists());
    let log = git.log(1).expect("log");
    assert_eq!(
        log[0].message,
        "Merging qa into release/qa/2024-01-02 for deployment"
    );
}

#[test]
fn restore_discards_manifest_edit() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().expect("tempdir");
    let (runner, _) = scratch_repo(dir.path());
    let mut git = GitCli::new(runner);

    fs::write(dir.path().join("package.json"), "{\"version\": \"1.1.0\"}\n").expect("write");
    assert!(!git.status().expect("status").clean);
    assert!(git.diff().expect("diff").contains("1.1.0"));

    git.restore(Path::new("package.json")).expect("restore");
    assert!(git.status().expect("status").clean);
}
