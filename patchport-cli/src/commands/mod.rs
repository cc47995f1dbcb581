//! Subcommand implementations and the wiring they share.

pub mod deploy;
pub mod patch;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use patchport_core::Config;
use patchport_engine::Session;
use patchport_exec::{GhCli, GitCli, SystemRunner};
use patchport_manifest::NpmManifest;

use crate::gates::InquireGates;

/// Options every command takes.
#[derive(Args, Debug, Clone)]
pub struct RepoArgs {
    /// Working tree to operate on.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub repo: PathBuf,

    /// Remote to pull from and push to (overrides `.patchport.yaml`).
    #[arg(long, value_name = "NAME")]
    pub remote: Option<String>,

    /// Log every command that is run.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RepoArgs {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(&self.repo)
            .with_context(|| format!("failed to load config for {}", self.repo.display()))?;
        if let Some(remote) = &self.remote {
            config.remote = remote.clone();
        }
        tracing::debug!(?config, "configuration");
        Ok(config)
    }
}

/// Real git, `gh`, package manager and terminal prompts for one working tree.
pub struct Adapters {
    git: GitCli<SystemRunner>,
    gh: GhCli<SystemRunner>,
    manifest: NpmManifest<SystemRunner>,
    gates: InquireGates,
}

impl Adapters {
    pub fn new(repo: &Path, config: &Config) -> Self {
        let runner = SystemRunner::new(repo);
        Self {
            git: GitCli::new(runner.clone()),
            gh: GhCli::with_program(runner.clone(), config.pr_host.clone()),
            manifest: NpmManifest::new(runner, repo, config.manifest.clone())
                .with_program(config.package_manager.clone()),
            gates: InquireGates,
        }
    }

    pub fn session<'a>(&'a mut self, config: &'a Config) -> Session<'a> {
        Session {
            vcs: &mut self.git,
            pull_requests: &mut self.gh,
            versions: &mut self.manifest,
            gates: &mut self.gates,
            config,
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
