//! Error types for patchport-engine.

use patchport_core::{EnvironmentError, NamingError};
use patchport_exec::{PullRequestError, VcsError};
use thiserror::Error;

/// Failures of the operator-facing prompts.
#[derive(Debug, Error)]
pub enum GateError {
    /// The operator dismissed the prompt (Esc / Ctrl-C).
    #[error("prompt cancelled")]
    Cancelled,

    /// A scripted gate ran out of answers, or got the wrong kind.
    #[error("no scripted answer for prompt '{prompt}'")]
    Exhausted { prompt: String },

    #[error("terminal prompt failed: {0}")]
    Terminal(String),
}

/// Errors that end a run before, or instead of, producing a summary.
///
/// Failures once branches are being changed are not errors here: they are
/// reported as a [`patchport_core::StageFailure`] inside the run summary.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("commit '{commit}' not found; check the commit id: {source}")]
    CommitNotFound {
        commit: String,
        #[source]
        source: VcsError,
    },

    #[error("description '{description}' has no letters or digits to build a branch name from")]
    EmptyDescription { description: String },

    #[error("aborted: {reason}")]
    UserAborted { reason: String },

    #[error("cannot deploy to '{environment}'; expected one of: qa, uat, prod")]
    InvalidDeployTarget { environment: String },

    #[error("not authenticated with the pull request host")]
    NotAuthenticated,

    #[error("remote '{remote}' is not configured (found: {})", .available.join(", "))]
    MissingRemote {
        remote: String,
        available: Vec<String>,
    },

    #[error("working tree has uncommitted changes on {branch}; commit or stash them first")]
    DirtyWorkingTree { branch: String },

    #[error("no commits found on branch '{branch}'")]
    NoCommits { branch: String },

    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error(transparent)]
    Naming(#[from] NamingError),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Vcs(#[from] VcsError),

    #[error(transparent)]
    PullRequest(#[from] PullRequestError),
}

impl EngineError {
    /// True when the operator chose to stop, as opposed to something failing.
    pub fn is_user_abort(&self) -> bool {
        matches!(
            self,
            EngineError::UserAborted { .. } | EngineError::Gate(GateError::Cancelled)
        )
    }

    pub(crate) fn aborted(reason: impl Into<String>) -> Self {
        EngineError::UserAborted {
            reason: reason.into(),
        }
    }
}
