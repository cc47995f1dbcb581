//! # patchport-manifest
//!
//! Reading and bumping the version recorded in the project's package
//! manifest. The bump itself is delegated to the package manager
//! (`npm version <level> --no-git-tag-version`); this crate reads the
//! manifest before and after and refuses any result that is not strictly
//! greater than what was there.

pub mod error;
pub mod npm;
pub mod version;

pub use error::ManifestError;
pub use npm::NpmManifest;
pub use version::{BumpLevel, Version, VersionChange};

use std::path::Path;

/// The version bump seam used by the engine.
pub trait VersionManager {
    /// Manifest path relative to the working tree, for staging and restoring.
    fn manifest_path(&self) -> &Path;

    /// Bump by `level` and return the old and new versions.
    ///
    /// Only the manifest file changes; nothing is committed or tagged.
    fn bump(&mut self, level: BumpLevel) -> Result<VersionChange, ManifestError>;
}
