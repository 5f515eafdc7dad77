//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid release selection: {message}")]
    Configuration { message: String },

    #[error("Deployment target not found in config: {target}")]
    UnknownTarget { target: String },

    #[error("Invalid config file: {message}")]
    InvalidConfig { message: String },

    #[error("Chart not found: {path}")]
    ChartNotFound { path: String },

    #[error("Invalid Chart.yaml: {message}")]
    InvalidChart { message: String },

    #[error("Directory name ({directory}) and Chart.yaml name ({chart}) must match")]
    ChartNameMismatch { directory: String, chart: String },

    #[error("Unsatisfied chart dependency: {name} {version} (expected under charts/)")]
    UnsatisfiedDependency { name: String, version: String },

    #[error("Archive error: {message}")]
    Archive { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid version: {0}")]
    InvalidVersion(#[from] semver::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
