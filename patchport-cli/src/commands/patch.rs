//! `patchport`: propagate one commit to other environments.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use patchport_core::{CommitId, Environment};
use patchport_engine::{
    preflight, propagate, select, EngineError, PropagationInput, RunSummary, Session,
};

use super::{init_tracing, Adapters, RepoArgs};
use crate::render;

/// Arguments for the default command.
#[derive(Args, Debug)]
pub struct PatchArgs {
    /// Commit to cherry-pick; picked from the origin's log when omitted.
    #[arg(short, long, value_name = "COMMIT")]
    pub commit: Option<String>,

    /// Environment the commit already lives on (develop, qa, uat, prod).
    #[arg(short, long, value_name = "ENV")]
    pub origin: Option<Environment>,

    /// Do not check `gh auth status` before starting.
    #[arg(long)]
    pub skip_auth_check: bool,

    #[command(flatten)]
    pub repo: RepoArgs,
}

impl PatchArgs {
    pub fn run(self) -> Result<ExitCode> {
        init_tracing(self.repo.verbose);
        let config = self.repo.load_config()?;
        let mut adapters = Adapters::new(&self.repo.repo, &config);
        let mut session = adapters.session(&config);

        render::banner();
        match self.drive(&mut session) {
            Ok(summary) => {
                render::run_summary(&summary);
                Ok(if summary.is_finalized() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                })
            }
            Err(err) if err.is_user_abort() => {
                render::aborted(&err);
                Ok(ExitCode::FAILURE)
            }
            Err(err) => Err(err).context("patch run failed"),
        }
    }

    fn drive(&self, session: &mut Session<'_>) -> Result<RunSummary, EngineError> {
        preflight::run(session, !self.skip_auth_check)?;

        let origin = match self.origin {
            Some(origin) => origin,
            None => select::choose_origin(session)?,
        };
        let commit = match &self.commit {
            Some(commit) => CommitId::from(commit.trim()),
            None => select::choose_commit(session, origin)?,
        };

        propagate(session, &PropagationInput { commit, origin })
    }
}
