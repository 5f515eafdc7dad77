//! Get command - list all published versions for the configured app

use std::path::Path;

use slipway_core::Config;
use slipway_repo::{RegistryClient, RepositoryFile};

use crate::error::{CliError, Result};

/// List every published version of the app, in YAML.
///
/// Versions come from the chart repository of the selected deployment
/// target; with no `--target`, the first deployment in the config is used.
pub async fn run(config_path: &Path, target: Option<&str>) -> Result<()> {
    let config = Config::load_from(config_path).map_err(|e| CliError::get(e.to_string()))?;

    let deployment = match target {
        Some(name) => config
            .deployment(name)
            .ok_or_else(|| CliError::get(format!("deployment target not found: {}", name)))?,
        None => config
            .deployments
            .first()
            .ok_or_else(|| CliError::get("no deployments configured"))?,
    };

    let repos = RepositoryFile::load().map_err(|e| CliError::get(e.to_string()))?;
    let client = RegistryClient::new(repos);

    let index = client
        .fetch_index(&deployment.chart_repository)
        .await
        .map_err(|e| CliError::get(e.to_string()))?;

    let versions = index.versions_of(&config.app);
    if versions.is_empty() {
        println!("No published versions for {}", config.app);
        return Ok(());
    }

    let yaml = serde_yaml::to_string(&versions).map_err(|e| CliError::get(e.to_string()))?;
    print!("{}", yaml);

    Ok(())
}
