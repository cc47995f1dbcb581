//! Git operations consumed by the engine.
//!
//! [`Vcs`] is the seam: [`GitCli`] shells out to `git` through a
//! [`CommandRunner`], tests substitute an in-memory repository.

use std::path::Path;

use patchport_core::CommitId;

use crate::error::VcsError;
use crate::runner::{CommandRunner, RunMode};

/// Field separator used in `git log --format` output.
const LOG_FIELD_SEP: char = '\u{1f}';

/// One line of `git log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub hash: CommitId,
    pub message: String,
}

/// Branch and cleanliness of the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoStatus {
    /// `None` on a detached HEAD.
    pub branch: Option<String>,
    /// No staged or unstaged changes to tracked files. Untracked files are ignored.
    pub clean: bool,
}

/// The version-control operations the engine needs.
pub trait Vcs {
    fn status(&mut self) -> Result<RepoStatus, VcsError>;
    fn checkout(&mut self, branch: &str) -> Result<(), VcsError>;
    fn pull(&mut self, remote: &str, branch: &str) -> Result<(), VcsError>;
    /// Create `name` from `base` and switch to it.
    fn checkout_new_branch(&mut self, name: &str, base: &str) -> Result<(), VcsError>;
    /// Merge `branch` with `--strategy=ours`: the merge is recorded but the
    /// current branch's tree is kept.
    fn merge_ours(&mut self, branch: &str, message: &str) -> Result<(), VcsError>;
    fn cherry_pick(&mut self, commit: &CommitId) -> Result<(), VcsError>;
    fn add(&mut self, path: &Path) -> Result<(), VcsError>;
    fn commit(&mut self, message: &str) -> Result<(), VcsError>;
    fn push(&mut self, remote: &str, branch: &str, set_upstream: bool) -> Result<(), VcsError>;
    /// Most recent commits on the current branch, newest first.
    fn log(&mut self, max_count: usize) -> Result<Vec<LogEntry>, VcsError>;
    /// Subject line of `commit`.
    fn commit_title(&mut self, commit: &CommitId) -> Result<String, VcsError>;
    fn diff(&mut self) -> Result<String, VcsError>;
    /// Discard working-tree changes to `path`.
    fn restore(&mut self, path: &Path) -> Result<(), VcsError>;
    fn list_remotes(&mut self) -> Result<Vec<String>, VcsError>;
}

// ---------------------------------------------------------------------------
// GitCli
// ---------------------------------------------------------------------------

/// [`Vcs`] backed by the `git` binary.
#[derive(Debug, Clone)]
pub struct GitCli<R> {
    runner: R,
}

impl<R: CommandRunner> GitCli<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    fn git(&self, operation: &'static str, args: &[&str]) -> Result<String, VcsError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.runner
            .run("git", &args, RunMode::Captured)
            .map_err(|source| VcsError::Command { operation, source })
    }
}

impl<R: CommandRunner> Vcs for GitCli<R> {
    fn status(&mut self) -> Result<RepoStatus, VcsError> {
        let output = self.git("status", &["status", "--porcelain=v1", "--branch"])?;
        parse_status(&output)
    }

    fn checkout(&mut self, branch: &str) -> Result<(), VcsError> {
        self.git("checkout", &["checkout", branch]).map(drop)
    }

    fn pull(&mut self, remote: &str, branch: &str) -> Result<(), VcsError> {
        self.git("pull", &["pull", remote, branch]).map(drop)
    }

    fn checkout_new_branch(&mut self, name: &str, base: &str) -> Result<(), VcsError> {
        self.git("checkout -b", &["checkout", "-b", name, base])
            .map(drop)
    }

    fn merge_ours(&mut self, branch: &str, message: &str) -> Result<(), VcsError> {
        let message_arg = format!("--message={message}");
        self.git(
            "merge",
            &["merge", "--strategy=ours", &message_arg, "--end-of-options", branch],
        )
        .map(drop)
    }

    fn cherry_pick(&mut self, commit: &CommitId) -> Result<(), VcsError> {
        self.git(
            "cherry-pick",
            &["cherry-pick", "--end-of-options", commit.as_str()],
        )
        .map(drop)
    }

    fn add(&mut self, path: &Path) -> Result<(), VcsError> {
        let path = path.to_string_lossy();
        self.git("add", &["add", "--", &path]).map(drop)
    }

    fn commit(&mut self, message: &str) -> Result<(), VcsError> {
        self.git("commit", &["commit", "--message", message])
            .map(drop)
    }

    fn push(&mut self, remote: &str, branch: &str, set_upstream: bool) -> Result<(), VcsError> {
        let mut args = vec!["push"];
        if set_upstream {
            args.push("--set-upstream");
        }
        args.extend([remote, branch]);
        self.git("push", &args).map(drop)
    }

    fn log(&mut self, max_count: usize) -> Result<Vec<LogEntry>, VcsError> {
        let max = format!("--max-count={max_count}");
        let output = self.git("log", &["log", &max, "--format=%H%x1f%s"])?;
        output
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.split_once(LOG_FIELD_SEP)
                    .map(|(hash, message)| LogEntry {
                        hash: CommitId::from(hash),
                        message: message.to_string(),
                    })
                    .ok_or_else(|| VcsError::UnexpectedOutput {
                        operation: "log",
                        output: line.to_string(),
                    })
            })
            .collect()
    }

    fn commit_title(&mut self, commit: &CommitId) -> Result<String, VcsError> {
        let title = self.git(
            "log",
            &[
                "log",
                "--format=%s",
                "--max-count=1",
                "--end-of-options",
                commit.as_str(),
            ],
        )?;
        Ok(title.trim().to_string())
    }

    fn diff(&mut self) -> Result<String, VcsError> {
        self.git("diff", &["diff"])
    }

    fn restore(&mut self, path: &Path) -> Result<(), VcsError> {
        let path = path.to_string_lossy();
        self.git("checkout --", &["checkout", "--", &path])
            .map(drop)
    }

    fn list_remotes(&mut self) -> Result<Vec<String>, VcsError> {
        let output = self.git("remote", &["remote"])?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }
}

/// Parse `git status --porcelain=v1 --branch`.
fn parse_status(output: &str) -> Result<RepoStatus, VcsError> {
    let mut lines = output.lines();
    let header = lines
        .next()
        .and_then(|line| line.strip_prefix("## "))
        .ok_or_else(|| VcsError::UnexpectedOutput {
            operation: "status",
            output: output.to_string(),
        })?;

    let branch = if header.starts_with("HEAD (no branch)") {
        None
    } else {
        let name = header.split("...").next().unwrap_or(header);
        let name = name.strip_prefix("No commits yet on ").unwrap_or(name);
        Some(name.split_whitespace().next().unwrap_or(name).to_string())
    };

    let clean = lines.all(|line| line.is_empty() || line.starts_with("??"));
    Ok(RepoStatus { branch, clean })
}
