//! Error types for patchport-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from environment lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvironmentError {
    /// The name does not match any registered environment.
    #[error("unknown environment '{name}'; expected one of: develop, qa, uat, prod")]
    UnknownEnvironment { name: String },
}

/// Errors from classification and naming.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NamingError {
    /// Origin and destination are the same environment.
    #[error("invalid environment pair: origin and destination are both '{environment}'")]
    InvalidPair { environment: String },
}

/// Errors from loading `.patchport.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure reading the config file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error; includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
