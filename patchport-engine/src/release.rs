//! Cutting a dated release branch for a whole environment.
//!
//! | target | source    | merged with `--strategy=ours` |
//! |--------|-----------|-------------------------------|
//! | qa     | develop   | qa                            |
//! | uat    | qa        | uat (minor bump on qa first)  |
//! | prod   | uat       | master                        |
//!
//! The keep-ours merge records the target branch as joined without taking any
//! of its content, which marks the environment as deployed.

use chrono::NaiveDate;
use patchport_core::naming::{release_branch_name, release_label, release_pr_title};
use patchport_core::{Environment, Stage, StageFailure};
use patchport_exec::PullRequestSpec;
use patchport_manifest::{BumpLevel, VersionChange};

use crate::error::{EngineError, GateError};
use crate::session::Session;

const RELEASE_PR_BODY: &str = "Auto Generated Deployment PR";
const MINOR_BUMP_MESSAGE: &str = "Bump minor version";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePlan {
    pub target: Environment,
    /// Environment the release branch is cut from.
    pub source: Environment,
    /// Branch merged into the release branch; also the PR base.
    pub merge_branch: String,
    pub release_branch: String,
    pub merge_message: String,
    pub pr_title: String,
    pub labels: Vec<String>,
    /// Minor-bump the source branch before cutting.
    pub bump_source: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BumpOutcome {
    /// Committed and pushed to the source branch.
    Committed(VersionChange),
    /// Operator declined; the manifest was restored.
    Discarded(VersionChange),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Opened { url: String },
    /// Branch pushed, PR creation failed. Not fatal.
    PrFailed { cause: String },
    /// Operator said no to the push; the branch exists only locally.
    PushDeclined,
    Aborted(StageFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseReport {
    pub plan: ReleasePlan,
    pub bump: Option<BumpOutcome>,
    pub outcome: ReleaseOutcome,
}

impl ReleaseReport {
    /// The release branch reached the remote.
    pub fn is_pushed(&self) -> bool {
        matches!(
            self.outcome,
            ReleaseOutcome::Opened { .. } | ReleaseOutcome::PrFailed { .. }
        )
    }
}

/// Work out names and routing for a release to `target` on `date`.
pub fn release_plan(
    target: Environment,
    date: NaiveDate,
    extra_labels: &[String],
) -> Result<ReleasePlan, EngineError> {
    let (source, bump_source) = match target {
        Environment::Qa => (Environment::Develop, false),
        Environment::Uat => (Environment::Qa, true),
        Environment::Prod => (Environment::Uat, false),
        Environment::Develop => {
            return Err(EngineError::InvalidDeployTarget {
                environment: target.name().to_string(),
            })
        }
    };
    let merge_branch = target.vcs_branch().to_string();
    let release_branch = release_branch_name(target, date);

    let mut labels = vec![release_label(target)];
    labels.extend(extra_labels.iter().cloned());

    Ok(ReleasePlan {
        target,
        source,
        merge_message: format!("Merging {merge_branch} into {release_branch} for deployment"),
        merge_branch,
        release_branch,
        pr_title: release_pr_title(target, date),
        labels,
        bump_source,
    })
}

enum Halt {
    Stage(StageFailure),
    Engine(EngineError),
}

impl From<GateError> for Halt {
    fn from(err: GateError) -> Self {
        Halt::Engine(err.into())
    }
}

fn failed(stage: Stage, branch: &str, cause: impl ToString) -> Halt {
    Halt::Stage(StageFailure {
        stage,
        branch: branch.to_string(),
        commit: None,
        cause: cause.to_string(),
    })
}

/// Cut, merge, and (on confirmation) push a release branch for `target`.
///
/// Stage failures are reported in [`ReleaseReport::outcome`]; `Err` is for
/// an invalid target or a prompt that could not be answered.
pub fn cut_release(
    session: &mut Session<'_>,
    target: Environment,
    date: NaiveDate,
) -> Result<ReleaseReport, EngineError> {
    let plan = release_plan(target, date, &session.config.release_labels)?;
    tracing::info!(environment = %target, branch = %plan.release_branch, "setting up deployment");

    let mut bump = None;
    let outcome = match run_release(session, &plan, &mut bump) {
        Ok(outcome) => outcome,
        Err(Halt::Stage(failure)) => {
            tracing::error!(stage = %failure.stage, branch = %failure.branch, error = %failure.cause, "release aborted");
            ReleaseOutcome::Aborted(failure)
        }
        Err(Halt::Engine(err)) => return Err(err),
    };

    Ok(ReleaseReport {
        plan,
        bump,
        outcome,
    })
}

fn run_release(
    session: &mut Session<'_>,
    plan: &ReleasePlan,
    bump: &mut Option<BumpOutcome>,
) -> Result<ReleaseOutcome, Halt> {
    if plan.bump_source {
        *bump = Some(bump_source(session, plan.source.vcs_branch())?);
    }

    // Target first, so the keep-ours merge records its latest commit.
    refresh(session, &plan.merge_branch)?;
    let source = plan.source.vcs_branch();
    refresh(session, source)?;

    let release = plan.release_branch.as_str();
    tracing::info!(branch = %release, "creating branch");
    session
        .vcs
        .checkout_new_branch(release, source)
        .map_err(|e| failed(Stage::CreateBranch, release, e))?;
    session
        .vcs
        .merge_ours(&plan.merge_branch, &plan.merge_message)
        .map_err(|e| failed(Stage::MergeTarget, release, e))?;

    let push = session.gates.confirm(
        &format!("Ready to push to {release} and create PR?"),
        false,
    )?;
    if !push {
        tracing::info!("push cancelled by user");
        return Ok(ReleaseOutcome::PushDeclined);
    }

    let remote = session.config.remote.clone();
    session
        .vcs
        .push(&remote, release, true)
        .map_err(|e| failed(Stage::Push, release, e))?;

    let spec = PullRequestSpec {
        title: plan.pr_title.clone(),
        body: RELEASE_PR_BODY.to_string(),
        base: plan.merge_branch.clone(),
        head: plan.release_branch.clone(),
        labels: plan.labels.clone(),
    };
    match session.pull_requests.create_pull_request(&spec) {
        Ok(url) => {
            tracing::info!(pr = %url, "pull request created");
            Ok(ReleaseOutcome::Opened { url })
        }
        Err(err) => {
            tracing::warn!(branch = %release, error = %err, "failed to create pull request");
            Ok(ReleaseOutcome::PrFailed {
                cause: err.to_string(),
            })
        }
    }
}

fn refresh(session: &mut Session<'_>, branch: &str) -> Result<(), Halt> {
    let remote = session.config.remote.clone();
    session
        .vcs
        .checkout(branch)
        .and_then(|()| session.vcs.pull(&remote, branch))
        .map_err(|e| failed(Stage::PrepareBase, branch, e))
}

fn bump_source(session: &mut Session<'_>, branch: &str) -> Result<BumpOutcome, Halt> {
    tracing::info!(%branch, "bumping minor version");
    refresh(session, branch)?;

    let change = session
        .versions
        .bump(BumpLevel::Minor)
        .map_err(|e| failed(Stage::BumpVersion, branch, e))?;
    let manifest = session.versions.manifest_path().to_path_buf();

    let decision = session
        .vcs
        .diff()
        .map_err(|e| failed(Stage::BumpVersion, branch, e))
        .and_then(|diff| {
            session
                .gates
                .show(&format!("Diff for version bump commit:\n{diff}"));
            session
                .gates
                .confirm(
                    &format!("Ready to commit and push version bump on branch {branch}?"),
                    false,
                )
                .map_err(Halt::from)
        });

    let commit = match decision {
        Ok(commit) => commit,
        Err(halt) => {
            if let Err(err) = session.vcs.restore(&manifest) {
                tracing::warn!(path = %manifest.display(), error = %err, "failed to restore manifest");
            }
            return Err(halt);
        }
    };

    if !commit {
        tracing::info!("version bump discarded");
        session
            .vcs
            .restore(&manifest)
            .map_err(|e| failed(Stage::BumpVersion, branch, e))?;
        return Ok(BumpOutcome::Discarded(change));
    }

    let remote = session.config.remote.clone();
    session
        .vcs
        .add(&manifest)
        .and_then(|()| session.vcs.commit(MINOR_BUMP_MESSAGE))
        .map_err(|e| failed(Stage::BumpVersion, branch, e))?;
    session
        .vcs
        .push(&remote, branch, false)
        .map_err(|e| failed(Stage::Push, branch, e))?;
    tracing::info!(from = %change.from, to = %change.to, "version bump committed and pushed");
    Ok(BumpOutcome::Committed(change))
}
