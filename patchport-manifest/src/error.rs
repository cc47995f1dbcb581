//! Error types for patchport-manifest.

use std::path::PathBuf;

use patchport_exec::ExecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} has no \"version\" field")]
    MissingVersion { path: PathBuf },

    #[error("'{value}' is not a valid version (expected MAJOR.MINOR.PATCH)")]
    InvalidVersion { value: String },

    /// The package manager's version command failed.
    #[error(transparent)]
    Command(#[from] ExecError),

    /// The version command succeeded but the manifest did not move forward.
    #[error("version did not increase: {from} -> {to}")]
    NotIncremented { from: String, to: String },
}
