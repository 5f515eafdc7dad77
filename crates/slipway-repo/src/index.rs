//! Chart repository index
//!
//! The index file maps chart names to their published versions. Chart names
//! live in a `BTreeMap` and version entries are kept sorted, so identical
//! inputs always serialize to identical bytes - merging is deterministic
//! and idempotent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{RepoError, Result};

/// Repository index file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexFile {
    /// API version
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// When this index was generated
    #[serde(default = "Utc::now")]
    pub generated: DateTime<Utc>,

    /// Charts indexed by name
    #[serde(default)]
    pub entries: BTreeMap<String, Vec<ChartEntry>>,
}

fn default_api_version() -> String {
    "v1".to_string()
}

impl Default for IndexFile {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            generated: Utc::now(),
            entries: BTreeMap::new(),
        }
    }
}

impl IndexFile {
    /// Create an empty index stamped now
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an index from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| RepoError::IndexParseError {
            message: e.to_string(),
        })
    }

    /// Load an index from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Write the index to disk atomically (write-then-rename), so a
    /// concurrent reader never observes a half-written file.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_yaml::to_string(self)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Get all versions of a chart
    pub fn get(&self, name: &str) -> Option<&Vec<ChartEntry>> {
        self.entries.get(name)
    }

    /// Get the latest (highest semver) published version of a chart
    pub fn latest_version(&self, name: &str) -> Option<semver::Version> {
        self.entries
            .get(name)?
            .iter()
            .filter_map(|e| semver::Version::parse(&e.version).ok())
            .max()
    }

    /// All version strings of a chart, highest first
    pub fn versions_of(&self, name: &str) -> Vec<String> {
        let mut entries: Vec<ChartEntry> = self.entries.get(name).cloned().unwrap_or_default();
        entries.sort_by(compare_versions_desc);
        entries.into_iter().map(|e| e.version).collect()
    }

    /// Add an entry to the index
    pub fn add_entry(&mut self, entry: ChartEntry) {
        self.entries
            .entry(entry.name.clone())
            .or_default()
            .push(entry);
    }

    /// Merge another index into this one.
    ///
    /// A chart present in both keeps the union of version entries,
    /// deduplicated by version with the receiver's entry winning. The
    /// receiver's `generated` stamp is preserved, keeping the merge a pure
    /// function of its inputs: merging the same index twice produces the
    /// same bytes as merging it once.
    pub fn merge(&mut self, other: IndexFile) {
        for (name, entries) in other.entries {
            let existing = self.entries.entry(name).or_default();
            for entry in entries {
                if !existing.iter().any(|e| e.version == entry.version) {
                    existing.push(entry);
                }
            }
        }
    }

    /// Sort version entries descending within each chart name.
    ///
    /// Valid semver versions order before malformed ones; malformed
    /// versions fall back to reverse lexicographic order.
    pub fn sort_entries(&mut self) {
        for entries in self.entries.values_mut() {
            entries.sort_by(compare_versions_desc);
        }
    }

    /// Build a fresh index from the chart archives in a directory.
    ///
    /// Every `.tgz` in `dir` contributes one entry; chart metadata is read
    /// from the archive itself and the download URL is `base_url/<file>`.
    pub fn index_directory(dir: &Path, base_url: &str) -> Result<Self> {
        let mut archives: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "tgz"))
            .collect();
        archives.sort();

        let mut index = IndexFile::new();
        let base = base_url.trim_end_matches('/');

        for archive in archives {
            let chart = slipway_core::read_chart_from_archive(&archive)?;
            let data = std::fs::read(&archive)?;

            let file_name = archive
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            index.add_entry(ChartEntry {
                name: chart.name,
                version: chart.version,
                description: chart.description,
                app_version: chart.app_version,
                urls: vec![format!("{}/{}", base, file_name)],
                digest: Some(compute_digest(&data)),
                created: Some(Utc::now()),
            });
        }

        index.sort_entries();
        Ok(index)
    }
}

fn compare_versions_desc(a: &ChartEntry, b: &ChartEntry) -> Ordering {
    let va = semver::Version::parse(&a.version).ok();
    let vb = semver::Version::parse(&b.version).ok();
    match (va, vb) {
        (Some(va), Some(vb)) => vb.cmp(&va),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.version.cmp(&a.version),
    }
}

/// Compute the SHA256 digest of archive bytes
fn compute_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

/// Chart entry in the index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartEntry {
    /// Chart name
    pub name: String,

    /// Chart version (semver)
    pub version: String,

    /// Description
    #[serde(default)]
    pub description: Option<String>,

    /// Application version
    #[serde(default)]
    pub app_version: Option<String>,

    /// URLs to download the chart archive
    #[serde(default)]
    pub urls: Vec<String>,

    /// SHA256 digest of the archive
    #[serde(default)]
    pub digest: Option<String>,

    /// Creation timestamp
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}
