//! Domain types shared by the engine and the CLI.
//!
//! Nothing here is persisted; every value lives for a single invocation.

use std::fmt;

use crate::environment::Environment;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// An opaque reference to a commit (full or abbreviated hash, or any revision
/// git accepts).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitId(pub String);

impl CommitId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First seven characters, for display.
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(7)
            .map(|(idx, _)| idx)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for CommitId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CommitId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Direction of a propagation relative to the pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Forward: towards a later environment.
    Patch,
    /// Backward: towards an earlier environment.
    Backport,
}

impl ActionKind {
    /// Lowercase form used as the branch prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Patch => "patch",
            ActionKind::Backport => "backport",
        }
    }

    /// Capitalised form used in PR titles and labels.
    pub fn label(self) -> &'static str {
        match self {
            ActionKind::Patch => "Patch",
            ActionKind::Backport => "Backport",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A step of a propagation or release run. Used to name where a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    PrepareBase,
    CreateBranch,
    CherryPick,
    MergeTarget,
    BumpVersion,
    Push,
    CreatePullRequest,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::PrepareBase => "checkout and pull base branch",
            Stage::CreateBranch => "create branch",
            Stage::CherryPick => "cherry-pick",
            Stage::MergeTarget => "merge target branch",
            Stage::BumpVersion => "bump version",
            Stage::Push => "push",
            Stage::CreatePullRequest => "create pull request",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Plans and outcomes
// ---------------------------------------------------------------------------

/// Everything needed to carry a change to one destination. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPlan {
    pub kind: ActionKind,
    pub origin: Environment,
    pub destination: Environment,
    /// `{kind}/from-{origin}-to-{destination}/{slug}`
    pub new_branch: String,
    /// The destination's real branch; the PR base.
    pub base_branch: String,
    pub pr_title: String,
    pub pr_body: String,
    pub pr_label: String,
}

/// A single propagation, as confirmed by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagationRequest {
    pub commit: CommitId,
    pub origin: Environment,
    /// Raw destination names in selection order. Validated per destination.
    pub destinations: Vec<String>,
    pub description: String,
}

/// A fatal failure: which stage, which branch, which commit.
///
/// `commit` is `None` for release cuts, which carry no single commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub stage: Stage,
    pub branch: String,
    pub commit: Option<CommitId>,
    pub cause: String,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed on branch '{}'", self.stage, self.branch)?;
        if let Some(commit) = &self.commit {
            write!(f, " for commit {commit}")?;
        }
        write!(f, ": {}", self.cause)
    }
}

/// What happened for one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropagationOutcome {
    /// Branch pushed and pull request opened.
    Succeeded { branch: String, pull_request: String },
    /// Destination rejected before any git work.
    Skipped { reason: String },
    Failed { stage: Stage, cause: String },
}

impl PropagationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PropagationOutcome::Succeeded { .. })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
