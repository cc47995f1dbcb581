//! # patchport-exec
//!
//! The process boundary. [`CommandRunner`] spawns external programs either
//! captured (stdout returned, failure on non-zero exit) or interactive
//! (terminal inherited). The git and `gh` adapters are built on top of it and
//! exposed behind the [`Vcs`] and [`PullRequestHost`] traits so the engine can
//! be driven by in-memory fakes.

pub mod error;
pub mod gh;
pub mod git;
pub mod runner;

pub use error::{ExecError, PullRequestError, VcsError};
pub use gh::{GhCli, PullRequestHost, PullRequestSpec};
pub use git::{GitCli, LogEntry, RepoStatus, Vcs};
pub use runner::{CommandRunner, RunMode, SystemRunner};
#[cfg(any(test, feature = "test-support"))]
pub use runner::{Invocation, ScriptedRunner};
