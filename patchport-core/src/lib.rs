//! PatchPort core library: environments, naming, domain types and config.
//!
//! Nothing here spawns processes; only `config` touches the filesystem.
//!
//! - [`environment`]: the fixed, ordered environment registry
//! - [`naming`]: description extraction, slugs, patch/backport classification
//! - [`types`]: branch plans, stages and per-destination outcomes
//! - [`config`]: optional `.patchport.yaml` settings
//! - [`error`]: error enums for the above

pub mod config;
pub mod environment;
pub mod error;
pub mod naming;
pub mod types;

pub use config::Config;
pub use environment::{Environment, Precedence};
pub use error::{ConfigError, EnvironmentError, NamingError};
pub use types::{
    ActionKind, BranchPlan, CommitId, PropagationOutcome, PropagationRequest, Stage, StageFailure,
};
