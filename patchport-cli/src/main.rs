//! PatchPort: carry a commit across the develop → qa → uat → prod pipeline.
//!
//! # Usage
//!
//! ```text
//! patchport [-c <commit>] [-o <origin>] [--skip-auth-check]
//! patchport deploy <qa|uat|prod> [--date YYYY-MM-DD]
//! ```
//!
//! Every command also takes `--repo <dir>`, `--remote <name>` and `-v`.

mod commands;
mod gates;
mod render;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{deploy::DeployArgs, patch::PatchArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "patchport",
    version,
    about = "Cherry-pick a commit into other environment branches and open the pull requests",
    long_about = None,
    args_conflicts_with_subcommands = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    patch: PatchArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Cut a dated release branch for an environment and open its deployment PR.
    Deploy(DeployArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Deploy(args)) => args.run(),
        None => cli.patch.run(),
    }
}
