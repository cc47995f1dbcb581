//! The environment registry.
//!
//! Environments form a fixed total order `develop < qa < uat < prod`. Each one
//! is backed by a long-lived branch; `prod` lives on `master`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EnvironmentError;

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// One stage of the release pipeline.
///
/// Variant declaration order *is* the pipeline order, so the derived `Ord`
/// agrees with [`Environment::position`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Develop,
    Qa,
    Uat,
    Prod,
}

impl Environment {
    /// Every environment, in pipeline order.
    pub const ALL: [Environment; 4] = [
        Environment::Develop,
        Environment::Qa,
        Environment::Uat,
        Environment::Prod,
    ];

    /// Lowercase identifier used on the command line and in branch names.
    pub fn name(self) -> &'static str {
        match self {
            Environment::Develop => "develop",
            Environment::Qa => "qa",
            Environment::Uat => "uat",
            Environment::Prod => "prod",
        }
    }

    /// Human-facing name used in PR titles and prompts.
    pub fn display_name(self) -> &'static str {
        match self {
            Environment::Develop => "Develop",
            Environment::Qa => "QA",
            Environment::Uat => "UAT",
            Environment::Prod => "Prod",
        }
    }

    /// The real branch in the repository.
    pub fn vcs_branch(self) -> &'static str {
        match self {
            Environment::Develop => "develop",
            Environment::Qa => "qa",
            Environment::Uat => "uat",
            Environment::Prod => "master",
        }
    }

    /// Zero-based index in the pipeline.
    pub fn position(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Environment {
    type Err = EnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(s)
    }
}

// ---------------------------------------------------------------------------
// Registry operations
// ---------------------------------------------------------------------------

/// Relative placement of one environment against another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    Before,
    After,
}

/// All environments in pipeline order.
pub fn list_environments() -> &'static [Environment] {
    &Environment::ALL
}

/// Resolve an environment by name. Surrounding whitespace and ASCII case are ignored.
pub fn lookup(name: &str) -> Result<Environment, EnvironmentError> {
    let wanted = name.trim();
    Environment::ALL
        .iter()
        .copied()
        .find(|env| env.name().eq_ignore_ascii_case(wanted))
        .ok_or_else(|| EnvironmentError::UnknownEnvironment {
            name: name.to_string(),
        })
}

/// Where `a` sits relative to `b`. `None` when they are the same environment.
pub fn compare(a: Environment, b: Environment) -> Option<Precedence> {
    match a.position().cmp(&b.position()) {
        std::cmp::Ordering::Less => Some(Precedence::Before),
        std::cmp::Ordering::Greater => Some(Precedence::After),
        std::cmp::Ordering::Equal => None,
    }
}

/// Environments a change from `origin` may be sent to, in pipeline order.
pub fn destination_candidates(origin: Environment) -> Vec<Environment> {
    Environment::ALL
        .iter()
        .copied()
        .filter(|env| *env != origin)
        .collect()
}

/// A destination name is valid when it is registered and differs from `origin`.
pub fn is_valid_destination(origin: Environment, destination: &str) -> bool {
    matches!(lookup(destination), Ok(env) if env != origin)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
