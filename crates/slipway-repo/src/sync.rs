//! Index synchronization
//!
//! Keeps the cached index of each configured repository fresh, and rebuilds
//! the index for a local directory of chart archives. Refreshing all
//! repositories fans out one download per entry and joins them all; a
//! failed refresh is reported but never cancels the others.

use futures::future::join_all;
use std::path::Path;
use tracing::{info, warn};

use crate::config::{RepositoryEntry, RepositoryFile, LOCAL_REPOSITORY};
use crate::error::{RepoError, Result};
use crate::index::IndexFile;

/// Synchronizer over the configured repositories
pub struct IndexSynchronizer {
    repos: RepositoryFile,
    http: reqwest::Client,
}

impl IndexSynchronizer {
    /// Create a synchronizer over a loaded repository file
    pub fn new(repos: RepositoryFile) -> Self {
        Self {
            repos,
            http: reqwest::Client::new(),
        }
    }

    /// Refresh one named repository's cached index.
    ///
    /// The repository named `local` is caller-managed and never
    /// downloaded; refreshing it is a silent no-op.
    pub async fn update_repo(&self, name: &str) -> Result<()> {
        let entry = self.repos.get(name)?;
        self.refresh(entry).await
    }

    /// Refresh every configured repository concurrently.
    ///
    /// Each download is an independent unit of work writing to its own
    /// cache path; the call joins all of them before returning, and one
    /// repository's failure does not block the rest.
    pub async fn update_repos(&self) -> Result<()> {
        if self.repos.repositories.is_empty() {
            return Err(RepoError::NoRepositoriesConfigured);
        }

        let refreshes = self.repos.repositories.iter().map(|entry| async move {
            if let Err(e) = self.refresh(entry).await {
                warn!(repo = %entry.name, error = %e, "Repository refresh failed");
            }
        });

        join_all(refreshes).await;
        Ok(())
    }

    /// Rebuild the index for a directory of chart archives.
    ///
    /// Writes `<chart_src>/index.yaml`. When `merge_to` is given, the
    /// existing index there is merged in first; if the file does not exist
    /// an empty index is persisted at that path so subsequent reads are
    /// stable.
    pub async fn update_index(
        &self,
        chart_src: &Path,
        base_url: &str,
        merge_to: Option<&Path>,
    ) -> Result<()> {
        let mut index = IndexFile::index_directory(chart_src, base_url)?;

        if let Some(merge_path) = merge_to {
            let existing = if merge_path.exists() {
                IndexFile::load(merge_path).map_err(|e| RepoError::IndexMergeFailed {
                    message: format!("{}: {}", merge_path.display(), e),
                })?
            } else {
                let empty = IndexFile::new();
                empty.write(merge_path)?;
                empty
            };
            index.merge(existing);
        }

        index.sort_entries();
        index.write(&chart_src.join("index.yaml"))
    }

    async fn refresh(&self, entry: &RepositoryEntry) -> Result<()> {
        if entry.name == LOCAL_REPOSITORY {
            return Ok(());
        }

        let url = format!("{}/index.yaml", entry.url.trim_end_matches('/'));
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RepoError::HttpError {
                status: status.as_u16(),
                message: format!("downloading {}", url),
            });
        }

        let body = response.text().await?;
        // Refuse to cache something that is not an index
        let index = IndexFile::from_yaml(&body)?;
        index.write(&entry.cache)?;

        info!(repo = %entry.name, cache = %entry.cache.display(), "Repository index refreshed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const INDEX_YAML: &str =
        "apiVersion: v1\nentries:\n  foo:\n    - name: foo\n      version: 1.3.0\n";

    fn entry(name: &str, url: &str, cache: &Path) -> RepositoryEntry {
        RepositoryEntry {
            name: name.to_string(),
            url: url.to_string(),
            cache: cache.to_path_buf(),
        }
    }

    async fn index_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index.yaml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(INDEX_YAML))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_update_repo_downloads_index() {
        let server = index_server().await;
        let dir = TempDir::new().unwrap();
        let cache = dir.path().join("acme-index.yaml");

        let mut repos = RepositoryFile::default();
        repos
            .repositories
            .push(entry("acme", &server.uri(), &cache));

        let sync = IndexSynchronizer::new(repos);
        sync.update_repo("acme").await.unwrap();

        let cached = IndexFile::load(&cache).unwrap();
        assert_eq!(cached.versions_of("foo"), vec!["1.3.0".to_string()]);
    }

    #[tokio::test]
    async fn test_update_repo_local_is_noop() {
        let dir = TempDir::new().unwrap();
        let cache = dir.path().join("local-index.yaml");

        let mut repos = RepositoryFile::default();
        // Unreachable URL; must never be contacted
        repos
            .repositories
            .push(entry(LOCAL_REPOSITORY, "http://127.0.0.1:1", &cache));

        let sync = IndexSynchronizer::new(repos);
        sync.update_repo(LOCAL_REPOSITORY).await.unwrap();
        assert!(!cache.exists());
    }

    #[tokio::test]
    async fn test_update_repo_unknown_name() {
        let mut repos = RepositoryFile::default();
        repos
            .repositories
            .push(entry("acme", "http://127.0.0.1:1", Path::new("/tmp/x.yaml")));

        let sync = IndexSynchronizer::new(repos);
        let err = sync.update_repo("nope").await.unwrap_err();
        assert!(matches!(err, RepoError::RepositoryNotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_repos_isolates_failures() {
        let server = index_server().await;
        let dir = TempDir::new().unwrap();
        let good_cache = dir.path().join("good-index.yaml");
        let bad_cache = dir.path().join("bad-index.yaml");

        let mut repos = RepositoryFile::default();
        repos
            .repositories
            .push(entry("good", &server.uri(), &good_cache));
        // Nothing listens here; this refresh fails
        repos
            .repositories
            .push(entry("bad", "http://127.0.0.1:1", &bad_cache));

        let sync = IndexSynchronizer::new(repos);
        sync.update_repos().await.unwrap();

        // The reachable repository was still refreshed
        assert!(good_cache.exists());
        assert!(!bad_cache.exists());
    }

    #[tokio::test]
    async fn test_update_repos_with_no_repositories() {
        let sync = IndexSynchronizer::new(RepositoryFile::default());
        let err = sync.update_repos().await.unwrap_err();
        assert!(matches!(err, RepoError::NoRepositoriesConfigured));
    }

    #[tokio::test]
    async fn test_update_index_writes_sorted_index() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("foo");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("Chart.yaml"), "name: foo\nversion: 0.0.1\n").unwrap();

        let charts_dir = temp.path().join("charts");
        slipway_core::package_chart(&src, "1.2.0".parse().unwrap(), &charts_dir, false).unwrap();
        slipway_core::package_chart(&src, "1.10.0".parse().unwrap(), &charts_dir, false).unwrap();

        let sync = IndexSynchronizer::new(RepositoryFile::default());
        sync.update_index(&charts_dir, "https://charts.acme.example", None)
            .await
            .unwrap();

        let index = IndexFile::load(&charts_dir.join("index.yaml")).unwrap();
        assert_eq!(
            index.versions_of("foo"),
            vec!["1.10.0".to_string(), "1.2.0".to_string()]
        );
    }

    #[tokio::test]
    async fn test_update_index_merges_existing() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("foo");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("Chart.yaml"), "name: foo\nversion: 0.0.1\n").unwrap();

        let charts_dir = temp.path().join("charts");
        slipway_core::package_chart(&src, "1.3.0".parse().unwrap(), &charts_dir, false).unwrap();

        // Existing index knows about an older version
        let merge_path = temp.path().join("existing.yaml");
        let mut existing = IndexFile::new();
        existing.add_entry(crate::index::ChartEntry {
            name: "foo".to_string(),
            version: "1.2.0".to_string(),
            ..Default::default()
        });
        existing.write(&merge_path).unwrap();

        let sync = IndexSynchronizer::new(RepositoryFile::default());
        sync.update_index(&charts_dir, "https://charts.acme.example", Some(&merge_path))
            .await
            .unwrap();

        let index = IndexFile::load(&charts_dir.join("index.yaml")).unwrap();
        assert_eq!(
            index.versions_of("foo"),
            vec!["1.3.0".to_string(), "1.2.0".to_string()]
        );
    }

    #[tokio::test]
    async fn test_update_index_creates_missing_merge_target() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("foo");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("Chart.yaml"), "name: foo\nversion: 0.0.1\n").unwrap();

        let charts_dir = temp.path().join("charts");
        slipway_core::package_chart(&src, "1.0.0".parse().unwrap(), &charts_dir, false).unwrap();

        let merge_path = temp.path().join("missing.yaml");
        let sync = IndexSynchronizer::new(RepositoryFile::default());
        sync.update_index(&charts_dir, "https://charts.acme.example", Some(&merge_path))
            .await
            .unwrap();

        // The empty merge target was persisted so subsequent reads are stable
        let persisted = IndexFile::load(&merge_path).unwrap();
        assert!(persisted.entries.is_empty());
    }
}
