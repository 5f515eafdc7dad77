//! Repository file management
//!
//! The repository file (`~/.slipway/repository/repositories.yaml`) is the
//! persisted list of named chart repositories. It is loaded once per
//! invocation and never mutated by the release core.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{RepoError, Result};

/// The conventional name of the caller-managed local repository; its index
/// is never downloaded.
pub const LOCAL_REPOSITORY: &str = "local";

/// Persisted repository list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryFile {
    /// API version
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Configured repositories, in file order
    #[serde(default)]
    pub repositories: Vec<RepositoryEntry>,
}

fn default_api_version() -> String {
    "v1".to_string()
}

impl Default for RepositoryFile {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            repositories: Vec::new(),
        }
    }
}

impl RepositoryFile {
    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from a specific path, enforcing unique names
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RepoError::InvalidRepositoryFile {
            message: format!("{}: {}", path.display(), e),
        })?;
        let file: Self = serde_yaml::from_str(&content)?;

        let mut seen = HashSet::new();
        for entry in &file.repositories {
            if !seen.insert(entry.name.as_str()) {
                return Err(RepoError::DuplicateRepository {
                    name: entry.name.clone(),
                });
            }
            url::Url::parse(&entry.url).map_err(|e| RepoError::InvalidRepositoryUrl {
                url: entry.url.clone(),
                reason: e.to_string(),
            })?;
        }

        Ok(file)
    }

    /// Save to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default repository file path (`~/.slipway/repository/repositories.yaml`)
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| RepoError::InvalidRepositoryFile {
            message: "could not determine home directory".to_string(),
        })?;
        Ok(home
            .join(".slipway")
            .join("repository")
            .join("repositories.yaml"))
    }

    /// Resolve a repository by name.
    ///
    /// An empty repository list and an unknown name are distinct failures:
    /// the first asks the user to configure a repository, the second to
    /// check the spelling.
    pub fn get(&self, name: &str) -> Result<&RepositoryEntry> {
        if self.repositories.is_empty() {
            return Err(RepoError::NoRepositoriesConfigured);
        }
        self.repositories
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| RepoError::RepositoryNotFound {
                name: name.to_string(),
            })
    }

    /// Resolve a repository name to its base URL
    pub fn url_of(&self, name: &str) -> Result<&str> {
        Ok(self.get(name)?.url.as_str())
    }

    /// List all repository names
    pub fn names(&self) -> Vec<&str> {
        self.repositories.iter().map(|r| r.name.as_str()).collect()
    }
}

/// One named repository
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryEntry {
    /// Unique name for this repository
    pub name: String,

    /// Repository base URL
    pub url: String,

    /// Local cache path for the downloaded index
    pub cache: PathBuf,
}
