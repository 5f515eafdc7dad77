//! Chart registry HTTP client
//!
//! Talks to the chart registry's `/api/charts` API: archive upload, chart
//! removal, and a best-effort existence probe. Repository names resolve to
//! base URLs through the loaded repository file.

use tracing::debug;

use crate::config::RepositoryFile;
use crate::error::{RepoError, Result};
use crate::index::IndexFile;

const CHARTS_API: &str = "/api/charts";

/// Client for a chart registry's HTTP API
pub struct RegistryClient {
    repos: RepositoryFile,
    http: reqwest::Client,
}

impl RegistryClient {
    /// Create a client over a loaded repository file
    pub fn new(repos: RepositoryFile) -> Self {
        Self {
            repos,
            http: reqwest::Client::new(),
        }
    }

    /// Upload a packaged chart archive.
    ///
    /// Any response status outside 2xx is a rejection, carrying the
    /// response body for diagnostics.
    pub async fn upload_chart(&self, archive: Vec<u8>, repo_name: &str) -> Result<()> {
        let url = self.post_url(repo_name)?;

        let response = self.http.post(&url).body(archive).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RepoError::UploadRejected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(())
    }

    /// Remove a published chart version. Only HTTP 200 is success.
    pub async fn remove_chart(&self, app: &str, repo_name: &str, version: &str) -> Result<()> {
        let url = self.chart_url(app, repo_name, version)?;

        let response = self.http.delete(&url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(RepoError::DeleteRejected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(())
    }

    /// Best-effort existence probe for an app/version pair.
    ///
    /// True iff the registry answers 200. Any failure - unknown repository,
    /// unreachable registry, non-200 status - reads as absence; the probe
    /// never errors and is not authoritative.
    pub async fn has_chart(&self, app: &str, repo_name: &str, version: &str) -> bool {
        let Ok(url) = self.chart_url(app, repo_name, version) else {
            return false;
        };

        match self.http.get(&url).send().await {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(e) => {
                debug!(error = %e, "Existence probe failed; treating as absent");
                false
            }
        }
    }

    /// Fetch and parse the repository's index file
    pub async fn fetch_index(&self, repo_name: &str) -> Result<IndexFile> {
        let base = self.repos.url_of(repo_name)?;
        let url = format!("{}/index.yaml", base.trim_end_matches('/'));

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RepoError::HttpError {
                status: status.as_u16(),
                message: format!("fetching {}", url),
            });
        }

        IndexFile::from_yaml(&response.text().await?)
    }

    fn post_url(&self, repo_name: &str) -> Result<String> {
        let base = self.repos.url_of(repo_name)?;
        Ok(format!("{}{}", base.trim_end_matches('/'), CHARTS_API))
    }

    fn chart_url(&self, app: &str, repo_name: &str, version: &str) -> Result<String> {
        let base = self.repos.url_of(repo_name)?;
        Ok(format!(
            "{}{}/{}/{}",
            base.trim_end_matches('/'),
            CHARTS_API,
            app,
            version
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepositoryEntry;
    use wiremock::matchers::{body_bytes, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn repos_for(url: &str) -> RepositoryFile {
        let mut repos = RepositoryFile::default();
        repos.repositories.push(RepositoryEntry {
            name: "acme".to_string(),
            url: url.to_string(),
            cache: std::env::temp_dir().join("acme-index.yaml"),
        });
        repos
    }

    #[tokio::test]
    async fn test_upload_chart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/charts"))
            .and(body_bytes(b"archive-bytes".to_vec()))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = RegistryClient::new(repos_for(&server.uri()));
        client
            .upload_chart(b"archive-bytes".to_vec(), "acme")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upload_rejected_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/charts"))
            .respond_with(ResponseTemplate::new(409).set_body_string("chart already exists"))
            .mount(&server)
            .await;

        let client = RegistryClient::new(repos_for(&server.uri()));
        let err = client.upload_chart(vec![1, 2, 3], "acme").await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::UploadRejected { status: 409, ref body } if body == "chart already exists"
        ));
    }

    #[tokio::test]
    async fn test_upload_unknown_repo() {
        let client = RegistryClient::new(repos_for("http://127.0.0.1:1"));
        let err = client.upload_chart(vec![], "other").await.unwrap_err();
        assert!(matches!(err, RepoError::RepositoryNotFound { .. }));
    }

    #[tokio::test]
    async fn test_remove_chart_only_200_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/charts/foo/1.3.0"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/charts/foo/9.9.9"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such chart"))
            .mount(&server)
            .await;

        let client = RegistryClient::new(repos_for(&server.uri()));
        client.remove_chart("foo", "acme", "1.3.0").await.unwrap();

        let err = client
            .remove_chart("foo", "acme", "9.9.9")
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::DeleteRejected { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_has_chart() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/charts/foo/1.3.0"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = RegistryClient::new(repos_for(&server.uri()));
        assert!(client.has_chart("foo", "acme", "1.3.0").await);
        assert!(!client.has_chart("foo", "acme", "0.0.1").await);
    }

    #[tokio::test]
    async fn test_has_chart_unreachable_registry_is_absence() {
        // Nothing listens here; the probe must still answer false
        let client = RegistryClient::new(repos_for("http://127.0.0.1:1"));
        assert!(!client.has_chart("foo", "acme", "1.3.0").await);
        assert!(!client.has_chart("anything", "acme", "0.0.0").await);
    }

    #[tokio::test]
    async fn test_has_chart_unknown_repo_is_absence() {
        let client = RegistryClient::new(RepositoryFile::default());
        assert!(!client.has_chart("foo", "acme", "1.3.0").await);
    }

    #[tokio::test]
    async fn test_fetch_index() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index.yaml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "apiVersion: v1\nentries:\n  foo:\n    - name: foo\n      version: 1.3.0\n",
            ))
            .mount(&server)
            .await;

        let client = RegistryClient::new(repos_for(&server.uri()));
        let index = client.fetch_index("acme").await.unwrap();
        assert_eq!(index.versions_of("foo"), vec!["1.3.0".to_string()]);
    }
}
