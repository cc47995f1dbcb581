//! `package.json` versions bumped through the package manager.

use std::fs;
use std::path::{Path, PathBuf};

use patchport_exec::{CommandRunner, RunMode};
use serde::Deserialize;

use crate::error::ManifestError;
use crate::version::{BumpLevel, Version, VersionChange};
use crate::VersionManager;

#[derive(Debug, Deserialize)]
struct PackageJson {
    version: Option<String>,
}

/// A `package.json` under `root`, bumped with `{program} version <level> --no-git-tag-version`.
///
/// The version command runs in the manifest's own directory, so a nested
/// manifest such as `app/package.json` is the one that changes.
#[derive(Debug, Clone)]
pub struct NpmManifest<R> {
    runner: R,
    root: PathBuf,
    manifest: PathBuf,
    program: String,
}

impl<R: CommandRunner> NpmManifest<R> {
    /// `manifest` is relative to `root`, which must be the runner's working directory.
    pub fn new(runner: R, root: impl Into<PathBuf>, manifest: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            root: root.into(),
            manifest: manifest.into(),
            program: "npm".to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn absolute_path(&self) -> PathBuf {
        self.root.join(&self.manifest)
    }

    /// Directory the version command runs in, relative to `root`.
    fn manifest_dir(&self) -> Option<&Path> {
        self.manifest
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
    }

    /// The version currently recorded in the manifest.
    pub fn current_version(&self) -> Result<Version, ManifestError> {
        let path = self.absolute_path();
        let content = fs::read_to_string(&path).map_err(|source| ManifestError::Io {
            path: path.clone(),
            source,
        })?;
        let package: PackageJson =
            serde_json::from_str(&content).map_err(|source| ManifestError::Json {
                path: path.clone(),
                source,
            })?;
        let raw = package
            .version
            .ok_or(ManifestError::MissingVersion { path })?;
        Version::parse(&raw)
    }
}

impl<R: CommandRunner> VersionManager for NpmManifest<R> {
    fn manifest_path(&self) -> &Path {
        &self.manifest
    }

    fn bump(&mut self, level: BumpLevel) -> Result<VersionChange, ManifestError> {
        let from = self.current_version()?;
        let args = vec![
            "version".to_string(),
            level.as_str().to_string(),
            "--no-git-tag-version".to_string(),
        ];
        self.runner
            .run_in(self.manifest_dir(), &self.program, &args, RunMode::Captured)?;
        let to = self.current_version()?;

        if to <= from {
            return Err(ManifestError::NotIncremented {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        tracing::info!(%from, %to, level = %level, "bumped version");
        Ok(VersionChange { from, to })
    }
}
