//! Checks run before the first prompt that can lead to a change.

use crate::error::EngineError;
use crate::session::Session;

/// Make sure the PR host will accept `pr create`, offering a login if not.
pub fn ensure_authenticated(session: &mut Session<'_>) -> Result<(), EngineError> {
    if session.pull_requests.is_authenticated()? {
        tracing::debug!("pull request host authenticated");
        return Ok(());
    }

    tracing::warn!("not logged in to the pull request host");
    let login = session.gates.confirm(
        "You are not logged in to GitHub. Would you like to authenticate now?",
        true,
    )?;
    if !login {
        return Err(EngineError::aborted("authentication declined"));
    }

    session.pull_requests.login()?;
    if session.pull_requests.is_authenticated()? {
        tracing::info!("authenticated");
        Ok(())
    } else {
        Err(EngineError::NotAuthenticated)
    }
}

/// The configured remote must exist; every pull and push goes there.
pub fn ensure_remote(session: &mut Session<'_>) -> Result<(), EngineError> {
    let available = session.vcs.list_remotes()?;
    if available.iter().any(|r| r == session.remote()) {
        Ok(())
    } else {
        Err(EngineError::MissingRemote {
            remote: session.remote().to_string(),
            available,
        })
    }
}

/// Refuse to start with modified tracked files; checkouts would carry them along.
pub fn ensure_clean(session: &mut Session<'_>) -> Result<(), EngineError> {
    let status = session.vcs.status()?;
    if status.clean {
        return Ok(());
    }
    Err(EngineError::DirtyWorkingTree {
        branch: status.branch.unwrap_or_else(|| "detached HEAD".to_string()),
    })
}

/// Remote and working-tree checks, then authentication unless `check_auth` is off.
pub fn run(session: &mut Session<'_>, check_auth: bool) -> Result<(), EngineError> {
    ensure_remote(session)?;
    ensure_clean(session)?;
    if check_auth {
        ensure_authenticated(session)?;
    }
    Ok(())
}
