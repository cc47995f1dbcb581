//! Pull-request hosting through the `gh` CLI.

use crate::error::{ExecError, PullRequestError};
use crate::runner::{CommandRunner, RunMode};

/// Everything `gh pr create` needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestSpec {
    pub title: String,
    pub body: String,
    pub base: String,
    pub head: String,
    pub labels: Vec<String>,
}

/// Opens pull requests and manages the host login.
pub trait PullRequestHost {
    /// `Ok(false)` when the host answered but the user is not logged in.
    fn is_authenticated(&mut self) -> Result<bool, PullRequestError>;
    /// Run the host's own login flow on the terminal.
    fn login(&mut self) -> Result<(), PullRequestError>;
    /// Returns whatever the host printed, usually the PR URL.
    fn create_pull_request(&mut self, spec: &PullRequestSpec) -> Result<String, PullRequestError>;
}

/// [`PullRequestHost`] backed by the GitHub CLI.
#[derive(Debug, Clone)]
pub struct GhCli<R> {
    runner: R,
    program: String,
}

impl<R: CommandRunner> GhCli<R> {
    pub fn new(runner: R) -> Self {
        Self::with_program(runner, "gh")
    }

    pub fn with_program(runner: R, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }
}

/// Argument vector for `gh pr create`, one element per flag value.
pub fn create_args(spec: &PullRequestSpec) -> Vec<String> {
    let mut args: Vec<String> = [
        "pr",
        "create",
        "--title",
        spec.title.as_str(),
        "--body",
        spec.body.as_str(),
        "--base",
        spec.base.as_str(),
        "--head",
        spec.head.as_str(),
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for label in &spec.labels {
        args.push("--label".to_string());
        args.push(label.clone());
    }
    args
}

impl<R: CommandRunner> PullRequestHost for GhCli<R> {
    fn is_authenticated(&mut self) -> Result<bool, PullRequestError> {
        let args = vec!["auth".to_string(), "status".to_string()];
        match self.runner.run(&self.program, &args, RunMode::Captured) {
            Ok(_) => Ok(true),
            Err(ExecError::Shell { .. }) => Ok(false),
            Err(source) => Err(PullRequestError::Command {
                operation: "auth status",
                source,
            }),
        }
    }

    fn login(&mut self) -> Result<(), PullRequestError> {
        let args = vec!["auth".to_string(), "login".to_string()];
        self.runner
            .run(&self.program, &args, RunMode::Interactive)
            .map(drop)
            .map_err(|source| PullRequestError::Command {
                operation: "auth login",
                source,
            })
    }

    fn create_pull_request(&mut self, spec: &PullRequestSpec) -> Result<String, PullRequestError> {
        tracing::info!(head = %spec.head, base = %spec.base, "creating pull request");
        self.runner
            .run(&self.program, &create_args(spec), RunMode::Captured)
            .map(|out| out.trim().to_string())
            .map_err(|source| PullRequestError::Command {
                operation: "pr create",
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ScriptedRunner;

    fn spec() -> PullRequestSpec {
        PullRequestSpec {
            title: r#"Patch | QA to UAT | TCK-9|fix|Fix "crash" (notes)"#.to_string(),
            body: "Patch PR automatically generated by PatchPort".to_string(),
            base: "uat".to_string(),
            head: "patch/from-qa-to-uat/fix-crash".to_string(),
            labels: vec!["Patch".to_string()],
        }
    }

    #[test]
    fn create_passes_title_with_quotes_as_one_argument() {
        let runner = ScriptedRunner::new();
        runner.reply("https://github.com/acme/web/pull/7\n");
        let mut gh = GhCli::new(&runner);
        let url = gh.create_pull_request(&spec()).unwrap();
        assert_eq!(url, "https://github.com/acme/web/pull/7");

        let call = &runner.argv()[0];
        assert_eq!(call[0], "gh");
        let title_at = call.iter().position(|a| a == "--title").unwrap();
        assert_eq!(call[title_at + 1], spec().title);
        assert_eq!(&call[call.len() - 2..], ["--label", "Patch"]);
    }

    #[test]
    fn one_label_flag_per_label() {
        let mut release = spec();
        release.labels = vec!["UAT Release".to_string(), "Do Not Merge".to_string()];
        let args = create_args(&release);
        assert_eq!(args.iter().filter(|a| *a == "--label").count(), 2);
        assert!(args.contains(&"Do Not Merge".to_string()));
    }

    #[test]
    fn auth_status_failure_means_logged_out() {
        let runner = ScriptedRunner::new();
        runner.fail(1, "You are not logged into any GitHub hosts.");
        let mut gh = GhCli::new(&runner);
        assert!(!gh.is_authenticated().unwrap());
    }

    #[test]
    fn login_runs_interactively() {
        let runner = ScriptedRunner::new();
        let mut gh = GhCli::with_program(&runner, "gh");
        gh.login().unwrap();
        assert_eq!(runner.invocations()[0].mode, RunMode::Interactive);
    }

    #[test]
    fn create_failure_is_reported() {
        let runner = ScriptedRunner::new();
        runner.fail(1, "label 'Patch' not found");
        let mut gh = GhCli::new(&runner);
        let err = gh.create_pull_request(&spec()).unwrap_err();
        assert!(err.to_string().contains("pr create"));
    }
}
