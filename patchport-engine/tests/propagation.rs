//! End-to-end propagation runs against in-memory collaborators.

use patchport_core::{CommitId, Config, Environment, PropagationOutcome, Stage};
use patchport_engine::fakes::{FakePullRequests, FakeVcs, FakeVersions, ScriptedGates};
use patchport_engine::{propagate, EngineError, PropagationInput, RunState, RunSummary, Session};
use patchport_manifest::Version;

const FIX: &str = "9f8e7d6c5b4a39281706";
const FIX_TITLE: &str = "TCK-9|fix|Fix crash (notes)";

struct Harness {
    vcs: FakeVcs,
    prs: FakePullRequests,
    versions: FakeVersions,
    gates: ScriptedGates,
    config: Config,
}

impl Harness {
    fn new() -> Self {
        let mut vcs = FakeVcs::pipeline();
        vcs.add_commit("qa", FIX, FIX_TITLE);
        Self {
            vcs,
            prs: FakePullRequests::new(),
            versions: FakeVersions::new(Version::new(2, 4, 1)),
            gates: ScriptedGates::new(),
            config: Config::default(),
        }
    }

    /// Accept the derived description, pick `destinations`, confirm.
    fn answer_yes_to(&mut self, destinations: &[&str]) -> &mut Self {
        self.gates
            .confirm_answer(true)
            .multi_answer(destinations)
            .confirm_answer(true);
        self
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
                commit: CommitId::from(FIX),
                origin,
            },
        )
    }

    fn count(&self, prefix: &str) -> usize {
        self.vcs
            .journal()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

#[test]
fn two_destinations_forward() {
    let mut h = Harness::new();
    h.answer_yes_to(&["uat", "prod"]);

    let summary = h.run(Environment::Qa).expect("run");

    assert!(summary.is_finalized());
    assert_eq!(summary.description, "Fix crash");
    assert_eq!(summary.succeeded(), 2);
    assert!(h.vcs.has_branch("patch/from-qa-to-uat/fix-crash"));
    assert!(h.vcs.has_branch("patch/from-qa-to-prod/fix-crash"));
    assert_eq!(h.count("checkout -b "), 2);
    assert_eq!(h.count("cherry-pick "), 2);
    assert_eq!(h.count("push --set-upstream "), 2);
    assert_eq!(h.versions.bumps().len(), 2);

    let created = h.prs.created();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0].title, "Patch | QA to UAT | TCK-9|fix|Fix crash (notes)");
    assert_eq!(created[0].base, "uat");
    assert_eq!(created[0].head, "patch/from-qa-to-uat/fix-crash");
    assert_eq!(created[0].labels, vec!["Patch"]);
    assert_eq!(created[1].base, "master");

    assert_eq!(
        h.vcs.messages("patch/from-qa-to-uat/fix-crash"),
        vec!["Version bump 2.4.1 -> 2.4.2", FIX_TITLE]
    );
    assert_eq!(h.vcs.current_branch(), "qa");
}

#[test]
fn steps_run_in_order_per_destination() {
    let mut h = Harness::new();
    h.answer_yes_to(&["develop"]);

    h.run(Environment::Qa).expect("run");

    let branch = "backport/from-qa-to-develop/fix-crash";
    assert_eq!(
        h.vcs.mutations(),
        vec![
            "checkout develop".to_string(),
            "pull origin develop".to_string(),
            format!("checkout -b {branch} develop"),
            format!("cherry-pick {FIX}"),
            "add package.json".to_string(),
            "commit Version bump 2.4.1 -> 2.4.2".to_string(),
            format!("push --set-upstream origin {branch}"),
            "checkout qa".to_string(),
        ]
    );
    assert_eq!(h.prs.created()[0].labels, vec!["Backport"]);
}

#[test]
fn cherry_pick_conflict_stops_before_next_destination() {
    let mut h = Harness::new();
    h.vcs.fail_on(&format!("cherry-pick {FIX}"), "CONFLICT (content): Merge conflict in app.js");
    h.answer_yes_to(&["uat", "prod"]);

    let summary = h.run(Environment::Qa).expect("run");

    assert_eq!(summary.state, RunState::Aborted);
    let abort = summary.abort.as_ref().expect("abort");
    assert_eq!(abort.stage, Stage::CherryPick);
    assert_eq!(abort.branch, "patch/from-qa-to-uat/fix-crash");
    assert_eq!(abort.commit, Some(CommitId::from(FIX)));
    assert!(abort.to_string().contains("resolve the conflicts manually"));
    assert_eq!(summary.not_attempted, vec!["prod"]);

    assert!(!h.vcs.journal().iter().any(|e| e.contains("master") || e.contains("prod")));
    assert!(h.prs.created().is_empty());
    assert!(h.versions.bumps().is_empty());
    // left on the conflicting branch
    assert_eq!(h.vcs.current_branch(), "patch/from-qa-to-uat/fix-crash");
}

#[test]
fn empty_selection_changes_nothing() {
    let mut h = Harness::new();
    h.gates.confirm_answer(true).multi_answer(&[]);

    let err = h.run(Environment::Qa).unwrap_err();

    assert!(err.is_user_abort());
    assert!(h.vcs.mutations().is_empty());
    assert!(h.prs.created().is_empty());
}

#[test]
fn declined_final_confirmation_changes_nothing() {
    let mut h = Harness::new();
    h.gates
        .confirm_answer(true)
        .multi_answer(&["uat"])
        .confirm_answer(false);

    let err = h.run(Environment::Qa).unwrap_err();

    assert!(matches!(err, EngineError::UserAborted { .. }));
    assert!(h.vcs.mutations().is_empty());
    assert_eq!(h.gates.remaining(), 0);
}

#[test]
fn pull_request_failure_continues_with_next_destination() {
    let mut h = Harness::new();
    h.prs.fail_for_head("patch/from-qa-to-uat/fix-crash");
    h.answer_yes_to(&["uat", "prod"]);

    let summary = h.run(Environment::Qa).expect("run");

    assert!(summary.is_finalized());
    assert!(summary.abort.is_none());
    assert!(matches!(
        summary.reports[0].outcome,
        PropagationOutcome::Failed {
            stage: Stage::CreatePullRequest,
            ..
        }
    ));
    assert!(summary.reports[1].outcome.is_success());
    assert_eq!(h.count("push --set-upstream "), 2);
    assert_eq!(h.prs.created().len(), 1);
}

#[test]
fn origin_is_never_offered_as_destination() {
    for origin in Environment::ALL {
        let mut h = Harness::new();
        h.gates.confirm_answer(true).multi_answer(&[]);
        let _ = h.run(origin);
        let offered = &h.gates.offered()[0];
        assert_eq!(offered.len(), 3);
        assert!(!offered.contains(&origin.name().to_string()));
    }
}

#[test]
fn push_rejection_is_fatal() {
    let mut h = Harness::new();
    h.vcs.fail_on(
        "push --set-upstream origin patch/from-qa-to-uat/fix-crash",
        "! [rejected] (fetch first)",
    );
    h.answer_yes_to(&["uat"]);

    let summary = h.run(Environment::Qa).expect("run");

    let abort = summary.abort.expect("abort");
    assert_eq!(abort.stage, Stage::Push);
    assert!(abort.cause.contains("rejected"));
    assert!(h.prs.created().is_empty());
    assert_eq!(h.vcs.current_branch(), "qa");
}
