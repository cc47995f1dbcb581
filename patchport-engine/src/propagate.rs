//! Carry one commit from its origin environment to a set of destinations.
//!
//! ```text
//! Init -> TitleResolved -> DescriptionConfirmed -> DestinationsSelected
//!      -> Propagating -> Finalized | Aborted
//! ```
//!
//! Nothing in the repository changes until the operator has confirmed the
//! description, picked destinations and said yes to the final prompt. After
//! that each destination goes through, in selection order:
//!
//! 1. checkout + pull of the destination branch   (fatal)
//! 2. new branch from it                          (fatal)
//! 3. cherry-pick                                 (fatal)
//! 4. patch version bump, committed               (fatal)
//! 5. push with upstream                          (fatal)
//! 6. pull request                                (logged, run continues)
//!
//! A fatal failure stops the run: remaining destinations are not attempted.

use std::fmt;

use patchport_core::environment::{is_valid_destination, lookup};
use patchport_core::naming::{build_branch_plan, classify, extract_description, to_slug};
use patchport_core::{
    BranchPlan, CommitId, Environment, PropagationOutcome, PropagationRequest, Stage,
    StageFailure,
};
use patchport_exec::PullRequestSpec;
use patchport_manifest::BumpLevel;

use crate::error::EngineError;
use crate::session::Session;

/// What the operator asked to propagate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagationInput {
    pub commit: CommitId,
    pub origin: Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    TitleResolved,
    DescriptionConfirmed,
    DestinationsSelected,
    Propagating,
    Finalized,
    Aborted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunState::Init => "init",
            RunState::TitleResolved => "title resolved",
            RunState::DescriptionConfirmed => "description confirmed",
            RunState::DestinationsSelected => "destinations selected",
            RunState::Propagating => "propagating",
            RunState::Finalized => "finalized",
            RunState::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

/// One destination's line in the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationReport {
    /// As selected by the operator.
    pub destination: String,
    /// `None` when the destination was skipped before a plan existed.
    pub branch: Option<String>,
    pub outcome: PropagationOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub commit: CommitId,
    pub commit_title: String,
    pub origin: Environment,
    pub description: String,
    pub reports: Vec<DestinationReport>,
    /// Destinations left untouched because an earlier one failed fatally.
    pub not_attempted: Vec<String>,
    pub abort: Option<StageFailure>,
    /// Set when the closing checkout failed. Never affects the outcome.
    pub cleanup_error: Option<String>,
    pub state: RunState,
}

impl RunSummary {
    /// Reached the end without a fatal failure. Failed pull requests still count.
    pub fn is_finalized(&self) -> bool {
        self.state == RunState::Finalized
    }

    pub fn succeeded(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome.is_success())
            .count()
    }
}

struct Run {
    state: RunState,
}

impl Run {
    fn advance(&mut self, next: RunState) {
        tracing::debug!(from = %self.state, to = %next, "run state");
        self.state = next;
    }
}

/// Drive a whole propagation run.
///
/// `Err` means the run ended before any change was made (unknown commit,
/// operator declined, prompt failure). Once branches are being changed the
/// result is always `Ok`; a fatal stage failure is in [`RunSummary::abort`].
pub fn propagate(
    session: &mut Session<'_>,
    input: &PropagationInput,
) -> Result<RunSummary, EngineError> {
    let mut run = Run {
        state: RunState::Init,
    };
    let commit = &input.commit;
    let origin = input.origin;

    let title = session
        .vcs
        .commit_title(commit)
        .map_err(|source| EngineError::CommitNotFound {
            commit: commit.to_string(),
            source,
        })?;
    run.advance(RunState::TitleResolved);

    let description = confirm_description(session, &title)?;
    run.advance(RunState::DescriptionConfirmed);

    let destinations = select_destinations(session, origin)?;
    run.advance(RunState::DestinationsSelected);

    session.gates.show("Final confirmation:");
    let go = session
        .gates
        .confirm(&format!("{origin} -> {}", destinations.join(" ")), false)?;
    if !go {
        return Err(EngineError::aborted(
            "final confirmation declined; select destination branches with the space bar",
        ));
    }
    run.advance(RunState::Propagating);

    let request = PropagationRequest {
        commit: commit.clone(),
        origin,
        destinations,
        description,
    };
    let mut summary = RunSummary {
        commit: request.commit.clone(),
        commit_title: title.clone(),
        origin,
        description: request.description.clone(),
        reports: Vec::with_capacity(request.destinations.len()),
        not_attempted: Vec::new(),
        abort: None,
        cleanup_error: None,
        state: run.state,
    };

    let mut queue = request.destinations.iter().cloned();
    while let Some(name) = queue.next() {
        let plan = match plan_destination(origin, &name, &request.description, &title) {
            Ok(plan) => plan,
            Err(reason) => {
                tracing::warn!(destination = %name, %reason, "skipping destination");
                summary.reports.push(DestinationReport {
                    destination: name,
                    branch: None,
                    outcome: PropagationOutcome::Skipped { reason },
                });
                continue;
            }
        };

        tracing::info!(
            kind = %plan.kind,
            from = plan.origin.display_name(),
            to = plan.destination.display_name(),
            branch = %plan.new_branch,
            "creating {}",
            plan.kind
        );

        let outcome = match carry(session, &request.commit, &plan) {
            Ok(url) => {
                tracing::info!(branch = %plan.new_branch, pr = %url, "pull request opened");
                PropagationOutcome::Succeeded {
                    branch: plan.new_branch.clone(),
                    pull_request: url,
                }
            }
            Err(Halt::PullRequest(cause)) => {
                tracing::warn!(branch = %plan.new_branch, error = %cause, "failed to create pull request");
                PropagationOutcome::Failed {
                    stage: Stage::CreatePullRequest,
                    cause,
                }
            }
            Err(Halt::Fatal(failure)) => {
                tracing::error!(stage = %failure.stage, branch = %failure.branch, error = %failure.cause, "aborting run");
                summary.reports.push(DestinationReport {
                    destination: name,
                    branch: Some(plan.new_branch.clone()),
                    outcome: PropagationOutcome::Failed {
                        stage: failure.stage,
                        cause: failure.cause.clone(),
                    },
                });
                summary.abort = Some(failure);
                summary.not_attempted = queue.by_ref().collect();
                break;
            }
        };
        summary.reports.push(DestinationReport {
            destination: name,
            branch: Some(plan.new_branch),
            outcome,
        });
    }

    summary.cleanup_error = cleanup(session, summary.abort.as_ref());
    run.advance(if summary.abort.is_some() {
        RunState::Aborted
    } else {
        RunState::Finalized
    });
    summary.state = run.state;
    Ok(summary)
}

// ---- gates before any change ----

fn confirm_description(session: &mut Session<'_>, title: &str) -> Result<String, EngineError> {
    session
        .gates
        .show(&format!("This commit will be cherry-picked:\n{}", title.trim()));

    let derived = extract_description(title);
    let accepted = session.gates.confirm(
        &format!("Correct description between the arrows?\n-> {derived} <-"),
        true,
    )?;
    let description = if accepted {
        derived
    } else {
        session
            .gates
            .free_text("Copy or write the description (should match commit above):")?
            .trim()
            .to_string()
    };

    if to_slug(&description).is_empty() {
        return Err(EngineError::EmptyDescription { description });
    }
    Ok(description)
}

fn select_destinations(
    session: &mut Session<'_>,
    origin: Environment,
) -> Result<Vec<String>, EngineError> {
    let choices: Vec<String> = patchport_core::environment::destination_candidates(origin)
        .into_iter()
        .map(|env| env.name().to_string())
        .collect();
    let picked = session.gates.select_many("Destination Branches", &choices)?;
    if picked.is_empty() {
        return Err(EngineError::aborted("no destination branch selected"));
    }
    Ok(picked)
}

/// Validate one selected name and derive its plan. `Err` carries the skip reason.
fn plan_destination(
    origin: Environment,
    name: &str,
    description: &str,
    title: &str,
) -> Result<BranchPlan, String> {
    if !is_valid_destination(origin, name) {
        return Err(format!("invalid branch: {origin} -> {name}"));
    }
    let destination = lookup(name).map_err(|e| e.to_string())?;
    let kind = classify(origin, destination).map_err(|e| e.to_string())?;
    Ok(build_branch_plan(origin, destination, kind, description, title))
}

// ---- per-destination work ----

enum Halt {
    Fatal(StageFailure),
    PullRequest(String),
}

fn carry(session: &mut Session<'_>, commit: &CommitId, plan: &BranchPlan) -> Result<String, Halt> {
    let remote = session.config.remote.clone();
    let base = plan.base_branch.as_str();
    let fatal = |stage: Stage, branch: &str, cause: String| {
        Halt::Fatal(StageFailure {
            stage,
            branch: branch.to_string(),
            commit: Some(commit.clone()),
            cause,
        })
    };

    session
        .vcs
        .checkout(base)
        .and_then(|()| session.vcs.pull(&remote, base))
        .map_err(|e| fatal(Stage::PrepareBase, base, e.to_string()))?;

    session
        .vcs
        .checkout_new_branch(&plan.new_branch, base)
        .map_err(|e| fatal(Stage::CreateBranch, &plan.new_branch, e.to_string()))?;

    session.vcs.cherry_pick(commit).map_err(|e| {
        fatal(
            Stage::CherryPick,
            &plan.new_branch,
            format!("{e}; resolve the conflicts manually"),
        )
    })?;

    let change = session
        .versions
        .bump(BumpLevel::Patch)
        .map_err(|e| fatal(Stage::BumpVersion, &plan.new_branch, e.to_string()))?;
    tracing::info!(branch = %base, from = %change.from, to = %change.to, "version bump");
    let manifest = session.versions.manifest_path().to_path_buf();
    session
        .vcs
        .add(&manifest)
        .and_then(|()| session.vcs.commit(&change.commit_message()))
        .map_err(|e| fatal(Stage::BumpVersion, &plan.new_branch, e.to_string()))?;

    session
        .vcs
        .push(&remote, &plan.new_branch, true)
        .map_err(|e| fatal(Stage::Push, &plan.new_branch, e.to_string()))?;

    let spec = PullRequestSpec {
        title: plan.pr_title.clone(),
        body: plan.pr_body.clone(),
        base: plan.base_branch.clone(),
        head: plan.new_branch.clone(),
        labels: vec![plan.pr_label.clone()],
    };
    session
        .pull_requests
        .create_pull_request(&spec)
        .map_err(|e| Halt::PullRequest(e.to_string()))
}

/// Leave the tree on the cleanup environment's branch. A failed cherry-pick is
/// left checked out so the operator can resolve it in place.
fn cleanup(session: &mut Session<'_>, abort: Option<&StageFailure>) -> Option<String> {
    if matches!(abort, Some(failure) if failure.stage == Stage::CherryPick) {
        tracing::info!("leaving the conflicting branch checked out");
        return None;
    }
    let branch = session.config.cleanup_environment.vcs_branch();
    match session.vcs.checkout(branch) {
        Ok(()) => None,
        Err(err) => {
            tracing::warn!(%branch, error = %err, "failed to check out cleanup branch");
            Some(format!("failed to check out {branch}: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakePullRequests, FakeVcs, FakeVersions, ScriptedGates};
    use patchport_core::Config;
    use patchport_manifest::Version;

    const HASH: &str = "c0ffee1234567890";

    struct Rig {
        vcs: FakeVcs,
        prs: FakePullRequests,
        versions: FakeVersions,
        gates: ScriptedGates,
        config: Config,
    }

    impl Rig {
        fn new() -> Self {
            let mut vcs = FakeVcs::pipeline();
            vcs.add_commit("develop", HASH, "JIRA-1|feat|Add login (details)");
            Self {
                vcs,
                prs: FakePullRequests::new(),
                versions: FakeVersions::new(Version::new(1, 2, 3)),
                gates: ScriptedGates::new(),
                config: Config::default(),
            }
        }

        fn run(&mut self, origin: Environment) -> Result<RunSummary, EngineError> {
            let mut session = Session {
                vcs: &mut self.vcs,
                pull_requests: &mut self.prs,
                versions: &mut self.versions,
                gates: &mut self.gates,
                config: &self.config,
            };
            propagate(
                &mut session,
                &PropagationInput {
                    commit: CommitId::from(HASH),
                    origin,
                },
            )
        }
    }

    #[test]
    fn unknown_commit_fails_before_any_prompt() {
        let mut rig = Rig::new();
        let mut session = Session {
            vcs: &mut rig.vcs,
            pull_requests: &mut rig.prs,
            versions: &mut rig.versions,
            gates: &mut rig.gates,
            config: &rig.config,
        };
        let err = propagate(
            &mut session,
            &PropagationInput {
                commit: CommitId::from("nope"),
                origin: Environment::Develop,
            },
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::CommitNotFound { ref commit, .. } if commit == "nope"));
        assert!(rig.gates.prompts().is_empty());
    }

    #[test]
    fn corrected_description_drives_branch_name() {
        let mut rig = Rig::new();
        rig.gates
            .confirm_answer(false)
            .text_answer("  Login screen  ")
            .multi_answer(&["qa"])
            .confirm_answer(true);
        let summary = rig.run(Environment::Develop).unwrap();
        assert_eq!(summary.description, "Login screen");
        assert_eq!(
            summary.reports[0].branch.as_deref(),
            Some("patch/from-develop-to-qa/login-screen")
        );
    }

    #[test]
    fn description_without_slug_is_rejected() {
        let mut rig = Rig::new();
        rig.gates.confirm_answer(false).text_answer("???");
        let err = rig.run(Environment::Develop).unwrap_err();
        assert!(matches!(err, EngineError::EmptyDescription { .. }));
        assert!(rig.vcs.mutations().is_empty());
    }

    #[test]
    fn empty_selection_aborts_without_changes() {
        let mut rig = Rig::new();
        rig.gates.confirm_answer(true).multi_answer(&[]);
        let err = rig.run(Environment::Uat).unwrap_err();
        assert!(err.is_user_abort());
        assert_eq!(rig.gates.prompts()[1], "Destination Branches");
        assert!(rig.vcs.mutations().is_empty());
    }

    #[test]
    fn final_prompt_lists_route() {
        let mut rig = Rig::new();
        rig.gates
            .confirm_answer(true)
            .multi_answer(&["qa", "prod"])
            .confirm_answer(false);
        let err = rig.run(Environment::Develop).unwrap_err();
        assert!(err.is_user_abort());
        assert_eq!(rig.gates.prompts()[2], "develop -> qa prod");
        assert!(rig.vcs.mutations().is_empty());
    }

    #[test]
    fn invalid_selection_is_skipped_not_fatal() {
        let mut rig = Rig::new();
        rig.gates
            .confirm_answer(true)
            .multi_answer(&["staging", "develop", "qa"])
            .confirm_answer(true);
        let summary = rig.run(Environment::Develop).unwrap();
        assert!(summary.is_finalized());
        assert!(matches!(
            summary.reports[0].outcome,
            PropagationOutcome::Skipped { .. }
        ));
        assert!(matches!(
            summary.reports[1].outcome,
            PropagationOutcome::Skipped { .. }
        ));
        assert!(summary.reports[2].outcome.is_success());
        assert_eq!(rig.prs.created().len(), 1);
    }

    #[test]
    fn stale_base_is_fatal_and_names_branch() {
        let mut rig = Rig::new();
        rig.vcs.fail_on("pull origin qa", "fatal: unable to access remote");
        rig.gates
            .confirm_answer(true)
            .multi_answer(&["qa", "uat"])
            .confirm_answer(true);
        let summary = rig.run(Environment::Develop).unwrap();
        let abort = summary.abort.as_ref().unwrap();
        assert_eq!(abort.stage, Stage::PrepareBase);
        assert_eq!(abort.branch, "qa");
        assert_eq!(summary.not_attempted, vec!["uat"]);
        assert_eq!(summary.state, RunState::Aborted);
        assert_eq!(rig.vcs.current_branch(), "qa");
    }

    #[test]
    fn bump_failure_is_fatal() {
        let mut rig = Rig::new();
        rig.versions.fail_bumps("npm ERR! missing script");
        rig.gates
            .confirm_answer(true)
            .multi_answer(&["qa"])
            .confirm_answer(true);
        let summary = rig.run(Environment::Develop).unwrap();
        assert_eq!(summary.abort.unwrap().stage, Stage::BumpVersion);
        assert!(!rig.vcs.journal().iter().any(|e| e.starts_with("push")));
    }

    #[test]
    fn cleanup_failure_is_only_reported() {
        let mut rig = Rig::new();
        rig.vcs.fail_on("checkout qa", "error: your local changes would be overwritten");
        rig.gates
            .confirm_answer(true)
            .multi_answer(&["uat"])
            .confirm_answer(true);
        let summary = rig.run(Environment::Develop).unwrap();
        assert!(summary.is_finalized());
        assert!(summary.cleanup_error.unwrap().contains("qa"));
    }

    #[test]
    fn cleanup_returns_to_configured_environment() {
        let mut rig = Rig::new();
        rig.config.cleanup_environment = Environment::Develop;
        rig.gates
            .confirm_answer(true)
            .multi_answer(&["qa"])
            .confirm_answer(true);
        let summary = rig.run(Environment::Develop).unwrap();
        assert!(summary.is_finalized());
        assert_eq!(rig.vcs.current_branch(), "develop");
        assert!(rig
            .vcs
            .journal()
            .contains(&"push --set-upstream origin patch/from-develop-to-qa/add-login".to_string()));
    }
}
