//! Error types for artifact-builder operations

use thiserror::Error;

/// Artifact builder errors
#[derive(Debug, Error)]
pub enum DockerError {
    #[error("Image build failed: {message}")]
    BuildFailed { message: String },

    #[error("Image push unauthorized: {message}")]
    PushUnauthorized { message: String },

    #[error("Image push failed: {message}")]
    PushFailed { message: String },

    #[error("Credential helper '{helper}' failed: {message}")]
    CredentialHelper { helper: String, message: String },

    #[error("{count} images found for reference {reference}; expected exactly one")]
    AmbiguousImageReference { reference: String, count: usize },

    #[error("Container engine error: {0}")]
    Engine(#[from] bollard::errors::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for artifact-builder operations
pub type Result<T> = std::result::Result<T, DockerError>;
