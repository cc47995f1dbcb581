//! `MAJOR.MINOR.PATCH[-pre]` versions, parsed by hand.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ManifestError;

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Option<String>,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: None,
        }
    }

    /// Parse `MAJOR.MINOR.PATCH` with an optional `-pre` suffix.
    ///
    /// A leading `v` is accepted, and `+build` metadata is discarded.
    pub fn parse(input: &str) -> Result<Self, ManifestError> {
        let invalid = || ManifestError::InvalidVersion {
            value: input.to_string(),
        };

        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        let trimmed = trimmed.split('+').next().unwrap_or(trimmed);
        let (numbers, pre) = match trimmed.split_once('-') {
            Some((_, "")) => return Err(invalid()),
            Some((numbers, pre)) => (numbers, Some(pre.to_string())),
            None => (trimmed, None),
        };

        let parts: Vec<&str> = numbers.split('.').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }
        let number = |s: &str| s.parse::<u64>().map_err(|_| invalid());

        Ok(Self {
            major: number(parts[0])?,
            minor: number(parts[1])?,
            patch: number(parts[2])?,
            pre,
        })
    }

    /// What `level` should produce from this version. Pre-release tags are dropped.
    pub fn bumped(&self, level: BumpLevel) -> Self {
        match level {
            BumpLevel::Patch if self.pre.is_some() => {
                Self::new(self.major, self.minor, self.patch)
            }
            BumpLevel::Patch => Self::new(self.major, self.minor, self.patch + 1),
            BumpLevel::Minor => Self::new(self.major, self.minor + 1, 0),
        }
    }
}

impl Ord for Version {
    /// Pre-release sorts below the release with the same numbers.
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ---------------------------------------------------------------------------
// Bumps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpLevel {
    /// Every propagation branch.
    Patch,
    /// UAT release cuts.
    Minor,
}

impl BumpLevel {
    /// Argument understood by `npm version`.
    pub fn as_str(self) -> &'static str {
        match self {
            BumpLevel::Patch => "patch",
            BumpLevel::Minor => "minor",
        }
    }
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful bump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChange {
    pub from: Version,
    pub to: Version,
}

impl VersionChange {
    /// `"Version bump {old} -> {new}"`
    pub fn commit_message(&self) -> String {
        format!("Version bump {} -> {}", self.from, self.to)
    }
}
