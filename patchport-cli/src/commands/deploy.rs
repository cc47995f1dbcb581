//! `patchport deploy`: cut a release branch for an environment.

use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Args;

use patchport_core::Environment;
use patchport_engine::{cut_release, preflight, EngineError, ReleaseOutcome, ReleaseReport, Session};

use super::{init_tracing, Adapters, RepoArgs};
use crate::render;

/// Arguments for `patchport deploy`.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Environment to release (qa, uat or prod).
    #[arg(value_name = "ENV")]
    pub environment: Environment,

    /// Date in the branch name; defaults to today (UTC).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    /// Do not check `gh auth status` before starting.
    #[arg(long)]
    pub skip_auth_check: bool,

    #[command(flatten)]
    pub repo: RepoArgs,
}

impl DeployArgs {
    pub fn run(self) -> Result<ExitCode> {
        init_tracing(self.repo.verbose);
        let config = self.repo.load_config()?;
        let mut adapters = Adapters::new(&self.repo.repo, &config);
        let mut session = adapters.session(&config);

        match self.drive(&mut session) {
            Ok(report) => {
                render::release_report(&report);
                Ok(match report.outcome {
                    ReleaseOutcome::Opened { .. } | ReleaseOutcome::PrFailed { .. } => {
                        ExitCode::SUCCESS
                    }
                    ReleaseOutcome::PushDeclined | ReleaseOutcome::Aborted(_) => {
                        ExitCode::FAILURE
                    }
                })
            }
            Err(err) if err.is_user_abort() => {
                render::aborted(&err);
                Ok(ExitCode::FAILURE)
            }
            Err(err) => Err(err)
                .with_context(|| format!("deployment to {} failed", self.environment)),
        }
    }

    fn drive(&self, session: &mut Session<'_>) -> Result<ReleaseReport, EngineError> {
        let date = self.release_date();
        // Reject `develop` before touching the repository or the PR host.
        patchport_engine::release_plan(self.environment, date, &[])?;
        preflight::run(session, !self.skip_auth_check)?;
        cut_release(session, self.environment, date)
    }

    /// `--date`, or today (UTC) read once per run.
    fn release_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Utc::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        deploy: DeployArgs,
    }

    #[test]
    fn explicit_date_is_used_as_is() {
        let args = Harness::parse_from(["patchport", "uat", "--date", "2024-01-02"]).deploy;
        assert_eq!(args.environment, Environment::Uat);
        assert_eq!(
            args.release_date(),
            NaiveDate::from_ymd_opt(2024, 1, 2).expect("date")
        );
    }

    #[test]
    fn default_date_is_today_utc() {
        let args = Harness::parse_from(["patchport", "qa"]).deploy;
        let before = Utc::now().date_naive();
        let date = args.release_date();
        let after = Utc::now().date_naive();
        assert!(date == before || date == after);
    }
}
