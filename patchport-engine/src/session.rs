use patchport_core::Config;
use patchport_exec::{PullRequestHost, Vcs};
use patchport_manifest::VersionManager;

use crate::gate::Gates;

/// The collaborators of one run, borrowed for its duration.
pub struct Session<'a> {
    pub vcs: &'a mut dyn Vcs,
    pub pull_requests: &'a mut dyn PullRequestHost,
    pub versions: &'a mut dyn VersionManager,
    pub gates: &'a mut dyn Gates,
    pub config: &'a Config,
}

impl Session<'_> {
    pub fn remote(&self) -> &str {
        &self.config.remote
    }
}
