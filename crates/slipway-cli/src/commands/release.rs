//! Release command - run the release pipeline for a deployment target

use console::style;
use std::path::Path;

use slipway_core::{Config, ReleaseKind};
use slipway_docker::DockerClient;
use slipway_release::{default_steps, Pipeline, ReleaseContext};
use slipway_repo::{IndexSynchronizer, RegistryClient, RepositoryFile};

use crate::error::{CliError, Result};

pub async fn run(
    config_path: &Path,
    target: &str,
    major: bool,
    minor: bool,
    patch: bool,
    rebuild: bool,
) -> Result<()> {
    // The version-bump selector is validated before anything else runs
    let kind = ReleaseKind::from_flags(major, minor, patch, rebuild)
        .map_err(|e| CliError::config(e.to_string()))?;

    let config = Config::load_from(config_path).map_err(|e| CliError::config(e.to_string()))?;
    let release_config = config
        .resolve(target)
        .map_err(|e| CliError::config(e.to_string()))?;

    let repos = RepositoryFile::load().map_err(|e| CliError::config(e.to_string()))?;
    let docker = DockerClient::new().map_err(|e| CliError::release(e.to_string()))?;
    let registry = RegistryClient::new(repos.clone());
    let sync = IndexSynchronizer::new(repos);

    println!(
        "{} {} ({} release, target {})",
        style("Releasing").cyan().bold(),
        config.app,
        kind,
        target
    );

    let mut ctx = ReleaseContext::new(release_config, kind, docker, registry, sync);
    let mut pipeline = Pipeline::new();
    pipeline
        .run(&mut ctx, &default_steps())
        .await
        .map_err(|e| CliError::release(e.to_string()))?;

    let version = ctx
        .version()
        .map(|v| v.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    println!(
        "  {} {} {}",
        style("Released").green().bold(),
        ctx.config.app,
        version
    );

    Ok(())
}
