//! Error types for patchport-exec.

use thiserror::Error;

/// Failure to run an external program.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The program could not be started at all (not installed, bad cwd, ...).
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran and exited unsuccessfully.
    #[error("command `{command}` exited with {}: {stderr}", describe_exit(.exit_code))]
    Shell {
        command: String,
        /// `None` when the process was killed by a signal.
        exit_code: Option<i32>,
        stderr: String,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

/// Errors from the git adapter.
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("git {operation} failed: {source}")]
    Command {
        operation: &'static str,
        #[source]
        source: ExecError,
    },

    #[error("unexpected output from git {operation}: {output:?}")]
    UnexpectedOutput {
        operation: &'static str,
        output: String,
    },
}

/// Errors from the PR-hosting adapter.
#[derive(Debug, Error)]
pub enum PullRequestError {
    #[error("{operation} failed: {source}")]
    Command {
        operation: &'static str,
        #[source]
        source: ExecError,
    },
}
