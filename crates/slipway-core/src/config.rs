//! Release configuration
//!
//! A `slipway.yaml` file declares the application and its deployment
//! targets. The caller resolves a target once, producing a read-only
//! [`ReleaseConfig`] the pipeline borrows for the run's duration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// Config file name looked up in the working directory
pub const CONFIG_FILE: &str = "slipway.yaml";

/// The `slipway.yaml` config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Application name; also the chart name releases are published under
    pub app: String,

    /// Deployment targets, selected with `--target`
    #[serde(default)]
    pub deployments: Vec<Deployment>,
}

impl Config {
    /// Load from the default location (`./slipway.yaml`)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::InvalidConfig {
            message: format!("{}: {}", path.display(), e),
        })?;
        let config: Self = serde_yaml::from_str(&content)?;

        if config.app.is_empty() {
            return Err(CoreError::InvalidConfig {
                message: "app name must not be empty".to_string(),
            });
        }

        Ok(config)
    }

    /// Get a deployment by name
    pub fn deployment(&self, name: &str) -> Option<&Deployment> {
        self.deployments.iter().find(|d| d.name == name)
    }

    /// Resolve a deployment target into the read-only per-release config
    pub fn resolve(&self, target: &str) -> Result<ReleaseConfig> {
        let deployment = self
            .deployment(target)
            .ok_or_else(|| CoreError::UnknownTarget {
                target: target.to_string(),
            })?;

        Ok(ReleaseConfig {
            app: self.app.clone(),
            target: deployment.name.clone(),
            build_context: deployment.build_context.clone(),
            chart_source: deployment.chart_source.clone(),
            chart_output: deployment.chart_output.clone(),
            image_repository: deployment.image_repository.clone(),
            chart_repository: deployment.chart_repository.clone(),
            credential_helper: deployment.credential_helper.clone(),
            save_local: deployment.save_local,
        })
    }
}

/// One deployment target in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// Unique target name
    pub name: String,

    /// Container build context directory (`~` shorthand allowed)
    #[serde(default = "default_dot")]
    pub build_context: PathBuf,

    /// Chart source directory; its basename must equal the chart name
    pub chart_source: PathBuf,

    /// Where packaged archives are written (`"."` resolves to the cwd)
    #[serde(default = "default_dot")]
    pub chart_output: PathBuf,

    /// Image repository the build is tagged with, e.g. `gcr.io/acme/foo`
    pub image_repository: String,

    /// Chart repository name, resolved against the repository file
    pub chart_repository: String,

    /// Docker credential helper suffix, e.g. `gcloud`
    pub credential_helper: String,

    /// Also register packaged archives in the local chart cache
    #[serde(default)]
    pub save_local: bool,
}

fn default_dot() -> PathBuf {
    PathBuf::from(".")
}

/// Resolved, read-only configuration for a single release run
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    pub app: String,
    pub target: String,
    pub build_context: PathBuf,
    pub chart_source: PathBuf,
    pub chart_output: PathBuf,
    pub image_repository: String,
    pub chart_repository: String,
    pub credential_helper: String,
    pub save_local: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
app: foo
deployments:
  - name: prod
    chartSource: ./deploy/foo
    imageRepository: gcr.io/acme/foo
    chartRepository: acme
    credentialHelper: gcloud
  - name: staging
    buildContext: ./svc
    chartSource: ./deploy/foo
    chartOutput: ./dist
    imageRepository: gcr.io/acme-staging/foo
    chartRepository: acme-staging
    credentialHelper: gcloud
    saveLocal: true
"#;

    #[test]
    fn test_parse_config() {
        let config: Config = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(config.app, "foo");
        assert_eq!(config.deployments.len(), 2);

        let prod = config.deployment("prod").unwrap();
        assert_eq!(prod.build_context, PathBuf::from("."));
        assert!(!prod.save_local);

        let staging = config.deployment("staging").unwrap();
        assert_eq!(staging.chart_output, PathBuf::from("./dist"));
        assert!(staging.save_local);
    }

    #[test]
    fn test_resolve_target() {
        let config: Config = serde_yaml::from_str(SAMPLE).unwrap();

        let release = config.resolve("prod").unwrap();
        assert_eq!(release.app, "foo");
        assert_eq!(release.target, "prod");
        assert_eq!(release.image_repository, "gcr.io/acme/foo");
        assert_eq!(release.chart_repository, "acme");
    }

    #[test]
    fn test_resolve_unknown_target() {
        let config: Config = serde_yaml::from_str(SAMPLE).unwrap();
        let err = config.resolve("nope").unwrap_err();
        assert!(matches!(err, CoreError::UnknownTarget { .. }));
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = Config::load_from(Path::new("/nonexistent/slipway.yaml")).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
    }

    #[test]
    fn test_empty_app_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "app: \"\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
    }
}
