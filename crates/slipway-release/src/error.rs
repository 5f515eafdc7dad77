//! Error types for the release pipeline

use thiserror::Error;

/// Release pipeline errors
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("Step '{step}' failed: {source}")]
    StepFailed {
        step: &'static str,
        #[source]
        source: Box<ReleaseError>,
    },

    #[error("No published version of {app} to rebuild")]
    NoPublishedVersion { app: String },

    #[error("Release version not resolved; the version step must run first")]
    VersionNotResolved,

    #[error("Chart not packaged; the package step must run first")]
    ChartNotPackaged,

    #[error(transparent)]
    Core(#[from] slipway_core::CoreError),

    #[error(transparent)]
    Docker(#[from] slipway_docker::DockerError),

    #[error(transparent)]
    Repo(#[from] slipway_repo::RepoError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;
