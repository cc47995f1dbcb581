//! # patchport-engine
//!
//! Orchestration of patch/backport propagation and release cuts.
//!
//! All collaborators are reached through traits bundled in a [`Session`]:
//! git ([`patchport_exec::Vcs`]), the PR host
//! ([`patchport_exec::PullRequestHost`]), the package manifest
//! ([`patchport_manifest::VersionManager`]) and the operator ([`Gates`]).
//! The `fakes` module (feature `test-support`) provides in-memory versions
//! of each.
//!
//! Runs are strictly sequential: one working tree, one checked-out branch.

pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod fakes;
pub mod gate;
pub mod preflight;
pub mod propagate;
pub mod release;
pub mod select;
pub mod session;

pub use error::{EngineError, GateError};
pub use gate::Gates;
pub use propagate::{propagate, DestinationReport, PropagationInput, RunState, RunSummary};
pub use release::{cut_release, release_plan, BumpOutcome, ReleaseOutcome, ReleasePlan, ReleaseReport};
pub use session::Session;
