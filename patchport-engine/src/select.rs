//! Picking the origin environment and the commit when they were not given.

use patchport_core::environment::{self, list_environments};
use patchport_core::{CommitId, Environment};

use crate::error::EngineError;
use crate::session::Session;

/// Ask which environment the change already lives on.
pub fn choose_origin(session: &mut Session<'_>) -> Result<Environment, EngineError> {
    let choices: Vec<String> = list_environments()
        .iter()
        .map(|env| env.name().to_string())
        .collect();
    let picked = session
        .gates
        .select_one("Select the origin branch where work exists:", &choices)?;
    Ok(environment::lookup(&picked)?)
}

/// Check out `origin`'s branch and offer its latest commits.
pub fn choose_commit(
    session: &mut Session<'_>,
    origin: Environment,
) -> Result<CommitId, EngineError> {
    let branch = origin.vcs_branch();
    session.vcs.checkout(branch)?;

    let entries = session.vcs.log(session.config.log_depth)?;
    if entries.is_empty() {
        return Err(EngineError::NoCommits {
            branch: branch.to_string(),
        });
    }

    let choices: Vec<String> = entries
        .iter()
        .map(|entry| format!("{} - {}", entry.hash.short(), entry.message))
        .collect();
    let picked = session
        .gates
        .select_one("Select a commit to cherry-pick:", &choices)?;

    choices
        .iter()
        .position(|choice| *choice == picked)
        .map(|idx| entries[idx].hash.clone())
        .ok_or_else(|| EngineError::aborted("no commit selected"))
}
