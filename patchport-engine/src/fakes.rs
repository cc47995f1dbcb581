//! In-memory collaborators for driving the engine without git, `gh`, npm or
//! a terminal.
//!
//! [`FakeVcs`] keeps its own branches and checked-out branch and writes every
//! call to a journal (`"checkout qa"`, `"cherry-pick abc123"`, ...). Any
//! journal entry can be made to fail with [`FakeVcs::fail_on`].

use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};

use patchport_core::CommitId;
use patchport_exec::{
    ExecError, LogEntry, PullRequestError, PullRequestHost, PullRequestSpec,
    RepoStatus, Vcs, VcsError,
};
use patchport_manifest::{BumpLevel, ManifestError, Version, VersionChange, VersionManager};

use crate::error::GateError;
use crate::gate::Gates;

fn shell_error(command: String, stderr: impl Into<String>) -> ExecError {
    ExecError::Shell {
        command,
        exit_code: Some(1),
        stderr: stderr.into(),
    }
}

// ---------------------------------------------------------------------------
// FakeVcs
// ---------------------------------------------------------------------------

/// Journal entries that do not change the repository.
const READ_ONLY: [&str; 5] = ["status", "log", "commit-title ", "diff", "remote"];

#[derive(Debug, Clone)]
pub struct FakeVcs {
    current: String,
    /// Branch name to its log, newest first.
    branches: BTreeMap<String, Vec<LogEntry>>,
    titles: BTreeMap<String, String>,
    remotes: Vec<String>,
    dirty: bool,
    diff: String,
    journal: Vec<String>,
    failures: BTreeMap<String, String>,
    next_hash: u32,
}

impl Default for FakeVcs {
    fn default() -> Self {
        Self::pipeline()
    }
}

impl FakeVcs {
    /// `develop`, `qa`, `uat` and `master`, all empty, `develop` checked out,
    /// one remote called `origin`.
    pub fn pipeline() -> Self {
        let branches = ["develop", "qa", "uat", "master"]
            .into_iter()
            .map(|b| (b.to_string(), Vec::new()))
            .collect();
        Self {
            current: "develop".to_string(),
            branches,
            titles: BTreeMap::new(),
            remotes: vec!["origin".to_string()],
            dirty: false,
            diff: String::new(),
            journal: Vec::new(),
            failures: BTreeMap::new(),
            next_hash: 0,
        }
    }

    /// Put a commit on top of `branch`. Adding it creates the branch if needed.
    pub fn add_commit(&mut self, branch: &str, hash: &str, title: &str) -> &mut Self {
        self.titles.insert(hash.to_string(), title.to_string());
        self.branches
            .entry(branch.to_string())
            .or_default()
            .insert(
                0,
                LogEntry {
                    hash: CommitId::from(hash),
                    message: title.to_string(),
                },
            );
        self
    }

    /// Make the call that would be journalled as `entry` fail.
    pub fn fail_on(&mut self, entry: &str, stderr: &str) -> &mut Self {
        self.failures.insert(entry.to_string(), stderr.to_string());
        self
    }

    pub fn set_dirty(&mut self) -> &mut Self {
        self.dirty = true;
        self
    }

    /// What [`Vcs::diff`] returns.
    pub fn set_diff(&mut self, diff: &str) -> &mut Self {
        self.diff = diff.to_string();
        self
    }

    pub fn current_branch(&self) -> &str {
        &self.current
    }

    pub fn has_branch(&self, name: &str) -> bool {
        self.branches.contains_key(name)
    }

    /// Subjects on `branch`, newest first.
    pub fn messages(&self, branch: &str) -> Vec<String> {
        self.branches
            .get(branch)
            .map(|log| log.iter().map(|e| e.message.clone()).collect())
            .unwrap_or_default()
    }

    pub fn journal(&self) -> &[String] {
        &self.journal
    }

    /// Journal entries that changed a branch, the checkout or the remote.
    pub fn mutations(&self) -> Vec<String> {
        self.journal
            .iter()
            .filter(|entry| !READ_ONLY.iter().any(|ro| entry.starts_with(ro)))
            .cloned()
            .collect()
    }

    fn record(&mut self, operation: &'static str, entry: String) -> Result<(), VcsError> {
        let failure = self.failures.get(&entry).cloned();
        self.journal.push(entry.clone());
        match failure {
            Some(stderr) => Err(self.error(operation, entry, stderr)),
            None => Ok(()),
        }
    }

    fn error(&self, operation: &'static str, entry: String, stderr: String) -> VcsError {
        VcsError::Command {
            operation,
            source: shell_error(format!("git {entry}"), stderr),
        }
    }

    fn require_branch(&self, operation: &'static str, entry: &str, name: &str) -> Result<(), VcsError> {
        if self.has_branch(name) {
            Ok(())
        } else {
            Err(self.error(
                operation,
                entry.to_string(),
                format!("error: pathspec '{name}' did not match any file(s) known to git"),
            ))
        }
    }

    fn push_entry(&mut self, message: &str) {
        self.next_hash += 1;
        let entry = LogEntry {
            hash: CommitId::from(format!("{:040x}", self.next_hash)),
            message: message.to_string(),
        };
        if let Some(log) = self.branches.get_mut(&self.current) {
            log.insert(0, entry);
        }
    }
}

impl Vcs for FakeVcs {
    fn status(&mut self) -> Result<RepoStatus, VcsError> {
        self.record("status", "status".to_string())?;
        Ok(RepoStatus {
            branch: Some(self.current.clone()),
            clean: !self.dirty,
        })
    }

    fn checkout(&mut self, branch: &str) -> Result<(), VcsError> {
        let entry = format!("checkout {branch}");
        self.record("checkout", entry.clone())?;
        self.require_branch("checkout", &entry, branch)?;
        self.current = branch.to_string();
        Ok(())
    }

    fn pull(&mut self, remote: &str, branch: &str) -> Result<(), VcsError> {
        let entry = format!("pull {remote} {branch}");
        self.record("pull", entry.clone())?;
        if !self.remotes.iter().any(|r| r == remote) {
            return Err(self.error(
                "pull",
                entry,
                format!("fatal: '{remote}' does not appear to be a git repository"),
            ));
        }
        Ok(())
    }

    fn checkout_new_branch(&mut self, name: &str, base: &str) -> Result<(), VcsError> {
        let entry = format!("checkout -b {name} {base}");
        self.record("checkout -b", entry.clone())?;
        if self.has_branch(name) {
            return Err(self.error(
                "checkout -b",
                entry,
                format!("fatal: a branch named '{name}' already exists"),
            ));
        }
        self.require_branch("checkout -b", &entry, base)?;
        let log = self.branches.get(base).cloned().unwrap_or_default();
        self.branches.insert(name.to_string(), log);
        self.current = name.to_string();
        Ok(())
    }

    fn merge_ours(&mut self, branch: &str, message: &str) -> Result<(), VcsError> {
        let entry = format!("merge --strategy=ours {branch}");
        self.record("merge", entry.clone())?;
        self.require_branch("merge", &entry, branch)?;
        self.push_entry(message);
        Ok(())
    }

    fn cherry_pick(&mut self, commit: &CommitId) -> Result<(), VcsError> {
        let entry = format!("cherry-pick {commit}");
        self.record("cherry-pick", entry.clone())?;
        match self.titles.get(commit.as_str()).cloned() {
            Some(title) => {
                self.push_entry(&title);
                Ok(())
            }
            None => Err(self.error(
                "cherry-pick",
                entry,
                format!("fatal: bad revision '{commit}'"),
            )),
        }
    }

    fn add(&mut self, path: &Path) -> Result<(), VcsError> {
        self.record("add", format!("add {}", path.display()))
    }

    fn commit(&mut self, message: &str) -> Result<(), VcsError> {
        self.record("commit", format!("commit {message}"))?;
        self.push_entry(message);
        self.dirty = false;
        Ok(())
    }

    fn push(&mut self, remote: &str, branch: &str, set_upstream: bool) -> Result<(), VcsError> {
        let entry = if set_upstream {
            format!("push --set-upstream {remote} {branch}")
        } else {
            format!("push {remote} {branch}")
        };
        self.record("push", entry)
    }

    fn log(&mut self, max_count: usize) -> Result<Vec<LogEntry>, VcsError> {
        self.record("log", "log".to_string())?;
        Ok(self
            .branches
            .get(&self.current)
            .map(|log| log.iter().take(max_count).cloned().collect())
            .unwrap_or_default())
    }

    fn commit_title(&mut self, commit: &CommitId) -> Result<String, VcsError> {
        let entry = format!("commit-title {commit}");
        self.record("log", entry.clone())?;
        self.titles.get(commit.as_str()).cloned().ok_or_else(|| {
            self.error(
                "log",
                entry,
                format!("fatal: ambiguous argument '{commit}': unknown revision"),
            )
        })
    }

    fn diff(&mut self) -> Result<String, VcsError> {
        self.record("diff", "diff".to_string())?;
        Ok(self.diff.clone())
    }

    fn restore(&mut self, path: &Path) -> Result<(), VcsError> {
        self.record("checkout --", format!("restore {}", path.display()))?;
        self.dirty = false;
        Ok(())
    }

    fn list_remotes(&mut self) -> Result<Vec<String>, VcsError> {
        self.record("remote", "remote".to_string())?;
        Ok(self.remotes.clone())
    }
}

// ---------------------------------------------------------------------------
// FakePullRequests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FakePullRequests {
    authenticated: bool,
    login_authenticates: bool,
    logins: usize,
    created: Vec<PullRequestSpec>,
    failing_heads: Vec<String>,
}

impl Default for FakePullRequests {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePullRequests {
    /// Logged in; every PR succeeds.
    pub fn new() -> Self {
        Self {
            authenticated: true,
            login_authenticates: true,
            logins: 0,
            created: Vec::new(),
            failing_heads: Vec::new(),
        }
    }

    pub fn logged_out(&mut self) -> &mut Self {
        self.authenticated = false;
        self
    }

    /// `login` returns success but leaves the host logged out.
    pub fn login_fails_silently(&mut self) -> &mut Self {
        self.login_authenticates = false;
        self
    }

    pub fn fail_for_head(&mut self, head: &str) -> &mut Self {
        self.failing_heads.push(head.to_string());
        self
    }

    pub fn created(&self) -> &[PullRequestSpec] {
        &self.created
    }

    pub fn logins(&self) -> usize {
        self.logins
    }
}

impl PullRequestHost for FakePullRequests {
    fn is_authenticated(&mut self) -> Result<bool, PullRequestError> {
        Ok(self.authenticated)
    }

    fn login(&mut self) -> Result<(), PullRequestError> {
        self.logins += 1;
        self.authenticated = self.login_authenticates;
        Ok(())
    }

    fn create_pull_request(&mut self, spec: &PullRequestSpec) -> Result<String, PullRequestError> {
        if self.failing_heads.contains(&spec.head) {
            return Err(PullRequestError::Command {
                operation: "pr create",
                source: shell_error(
                    format!("gh pr create --head {}", spec.head),
                    "could not add label: 'Patch' not found",
                ),
            });
        }
        self.created.push(spec.clone());
        Ok(format!(
            "https://github.com/acme/web/pull/{}",
            self.created.len()
        ))
    }
}

// ---------------------------------------------------------------------------
// FakeVersions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FakeVersions {
    path: PathBuf,
    current: Version,
    fail_with: Option<String>,
    bumps: Vec<VersionChange>,
}

impl FakeVersions {
    pub fn new(version: Version) -> Self {
        Self {
            path: PathBuf::from("package.json"),
            current: version,
            fail_with: None,
            bumps: Vec::new(),
        }
    }

    /// Every later bump fails with `stderr`.
    pub fn fail_bumps(&mut self, stderr: &str) -> &mut Self {
        self.fail_with = Some(stderr.to_string());
        self
    }

    pub fn bumps(&self) -> &[VersionChange] {
        &self.bumps
    }

    pub fn current(&self) -> &Version {
        &self.current
    }
}

impl VersionManager for FakeVersions {
    fn manifest_path(&self) -> &Path {
        &self.path
    }

    fn bump(&mut self, level: BumpLevel) -> Result<VersionChange, ManifestError> {
        if let Some(stderr) = &self.fail_with {
            return Err(ManifestError::Command(shell_error(
                format!("npm version {level} --no-git-tag-version"),
                stderr.clone(),
            )));
        }
        let change = VersionChange {
            from: self.current.clone(),
            to: self.current.bumped(level),
        };
        self.current = change.to.clone();
        self.bumps.push(change.clone());
        Ok(change)
    }
}

// ---------------------------------------------------------------------------
// ScriptedGates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Answer {
    Confirm(bool),
    One(String),
    Many(Vec<String>),
    Text(String),
}

/// Answers prompts from a queue, in order, and records every prompt.
///
/// A prompt whose next queued answer is missing or of another kind fails with
/// [`GateError::Exhausted`], so an unexpected prompt shows up as an error.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGates {
    answers: VecDeque<Answer>,
    prompts: Vec<String>,
    offered: Vec<Vec<String>>,
    shown: Vec<String>,
}

impl ScriptedGates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn confirm_answer(&mut self, yes: bool) -> &mut Self {
        self.answers.push_back(Answer::Confirm(yes));
        self
    }

    pub fn select_answer(&mut self, choice: &str) -> &mut Self {
        self.answers.push_back(Answer::One(choice.to_string()));
        self
    }

    pub fn multi_answer(&mut self, choices: &[&str]) -> &mut Self {
        self.answers.push_back(Answer::Many(
            choices.iter().map(|c| c.to_string()).collect(),
        ));
        self
    }

    pub fn text_answer(&mut self, text: &str) -> &mut Self {
        self.answers.push_back(Answer::Text(text.to_string()));
        self
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Choice lists passed to `select_one` / `select_many`, in order.
    pub fn offered(&self) -> &[Vec<String>] {
        &self.offered
    }

    pub fn shown(&self) -> &[String] {
        &self.shown
    }

    /// Answers still queued.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, prompt: &str) -> Result<Answer, GateError> {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().ok_or_else(|| GateError::Exhausted {
            prompt: prompt.to_string(),
        })
    }
}

impl Gates for ScriptedGates {
    fn confirm(&mut self, prompt: &str, _default: bool) -> Result<bool, GateError> {
        match self.next(prompt)? {
            Answer::Confirm(yes) => Ok(yes),
            _ => Err(GateError::Exhausted {
                prompt: prompt.to_string(),
            }),
        }
    }

    fn select_one(&mut self, prompt: &str, choices: &[String]) -> Result<String, GateError> {
        self.offered.push(choices.to_vec());
        match self.next(prompt)? {
            Answer::One(choice) => Ok(choice),
            _ => Err(GateError::Exhausted {
                prompt: prompt.to_string(),
            }),
        }
    }

    fn select_many(&mut self, prompt: &str, choices: &[String]) -> Result<Vec<String>, GateError> {
        self.offered.push(choices.to_vec());
        match self.next(prompt)? {
            Answer::Many(choices) => Ok(choices),
            _ => Err(GateError::Exhausted {
                prompt: prompt.to_string(),
            }),
        }
    }

    fn free_text(&mut self, prompt: &str) -> Result<String, GateError> {
        match self.next(prompt)? {
            Answer::Text(text) => Ok(text),
            _ => Err(GateError::Exhausted {
                prompt: prompt.to_string(),
            }),
        }
    }

    fn show(&mut self, text: &str) {
        self.shown.push(text.to_string());
    }
}
