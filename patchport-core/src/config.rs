//! Optional per-repository settings.
//!
//! # Lookup order
//!
//! ```text
//! <repo>/.patchport.yaml        (checked in, shared by the team)
//! ~/.patchport/config.yaml      (personal fallback)
//! built-in defaults
//! ```
//!
//! The first file found wins; fields it omits take their defaults. The
//! environment registry is not configurable.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::error::ConfigError;

pub const REPO_CONFIG_FILE: &str = ".patchport.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shared remote for pull and push.
    pub remote: String,
    /// Environment whose branch is checked out once a run ends.
    pub cleanup_environment: Environment,
    /// Commits offered when picking one interactively.
    pub log_depth: usize,
    /// Package manifest, relative to the working tree.
    pub manifest: PathBuf,
    /// Program that owns the manifest's version command.
    pub package_manager: String,
    /// Program used to open pull requests.
    pub pr_host: String,
    /// Labels added to release PRs next to `"{ENV} Release"`.
    pub release_labels: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            cleanup_environment: Environment::Qa,
            log_depth: 20,
            manifest: PathBuf::from("package.json"),
            package_manager: "npm".to_string(),
            pr_host: "gh".to_string(),
            release_labels: vec!["Do Not Merge".to_string()],
        }
    }
}

impl Config {
    /// Load from `repo` or, failing that, from `home`. Neither file → defaults.
    pub fn load_at(repo: &Path, home: Option<&Path>) -> Result<Self, ConfigError> {
        let repo_file = repo.join(REPO_CONFIG_FILE);
        if repo_file.exists() {
            return Self::from_file(&repo_file);
        }
        if let Some(home) = home {
            let user_file = user_config_path_at(home);
            if user_file.exists() {
                return Self::from_file(&user_file);
            }
        }
        Ok(Self::default())
    }

    /// `load_at` with the home directory from `dirs::home_dir()`.
    pub fn load(repo: &Path) -> Result<Self, ConfigError> {
        let home = dirs::home_dir();
        Self::load_at(repo, home.as_deref())
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// `<home>/.patchport/config.yaml`. Pure, no I/O.
pub fn user_config_path_at(home: &Path) -> PathBuf {
    home.join(".patchport").join("config.yaml")
}
