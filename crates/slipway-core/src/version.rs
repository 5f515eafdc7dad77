//! Release versions and bump selection
//!
//! A release version is a plain semantic triple. The bump strategy is chosen
//! once per release from the mutually exclusive `--major|--minor|--patch|
//! --rebuild` flags and never changes mid-run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A released application version (semantic triple)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Produce the successor version for a bump kind.
    ///
    /// `Rebuild` reuses the version unchanged; a minor bump zeroes the patch
    /// component and a major bump zeroes both.
    pub fn bump(&self, kind: ReleaseKind) -> Version {
        match kind {
            ReleaseKind::Major => Version::new(self.major + 1, 0, 0),
            ReleaseKind::Minor => Version::new(self.major, self.minor + 1, 0),
            ReleaseKind::Patch => Version::new(self.major, self.minor, self.patch + 1),
            ReleaseKind::Rebuild => *self,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let v = semver::Version::parse(s)?;
        Ok(Self::new(v.major, v.minor, v.patch))
    }
}

impl From<&semver::Version> for Version {
    fn from(v: &semver::Version) -> Self {
        Self::new(v.major, v.minor, v.patch)
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Which version-bump strategy a release runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseKind {
    Major,
    Minor,
    Patch,
    /// Reuse the latest published version unchanged
    Rebuild,
}

impl ReleaseKind {
    /// Build a release kind from the CLI flag set.
    ///
    /// Exactly one flag must be set; zero or several is a configuration
    /// error, surfaced before any pipeline step runs.
    pub fn from_flags(major: bool, minor: bool, patch: bool, rebuild: bool) -> Result<Self> {
        let selected = [
            (major, ReleaseKind::Major),
            (minor, ReleaseKind::Minor),
            (patch, ReleaseKind::Patch),
            (rebuild, ReleaseKind::Rebuild),
        ];

        let mut chosen = selected.iter().filter(|(set, _)| *set).map(|(_, k)| *k);

        match (chosen.next(), chosen.next()) {
            (Some(kind), None) => Ok(kind),
            (None, _) => Err(CoreError::Configuration {
                message: "one of --major, --minor, --patch or --rebuild is required".to_string(),
            }),
            (Some(_), Some(_)) => Err(CoreError::Configuration {
                message: "--major, --minor, --patch and --rebuild are mutually exclusive"
                    .to_string(),
            }),
        }
    }

    /// Whether this release reuses the latest published version.
    pub fn is_rebuild(&self) -> bool {
        matches!(self, ReleaseKind::Rebuild)
    }
}

impl fmt::Display for ReleaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReleaseKind::Major => "major",
            ReleaseKind::Minor => "minor",
            ReleaseKind::Patch => "patch",
            ReleaseKind::Rebuild => "rebuild",
        };
        write!(f, "{}", s)
    }
}
