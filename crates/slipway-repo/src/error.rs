//! Error types for repository operations

use thiserror::Error;

/// Repository operation errors
#[derive(Debug, Error)]
pub enum RepoError {
    // ============ Repository File Errors ============
    #[error("Repository not found: {name}")]
    RepositoryNotFound { name: String },

    #[error("No repositories configured; add one to the repository file")]
    NoRepositoriesConfigured,

    #[error("Duplicate repository name: {name}")]
    DuplicateRepository { name: String },

    #[error("Invalid repository file: {message}")]
    InvalidRepositoryFile { message: String },

    #[error("Invalid repository URL: {url} - {reason}")]
    InvalidRepositoryUrl { url: String, reason: String },

    // ============ Registry Errors ============
    #[error("Chart upload rejected: {status} - {body}")]
    UploadRejected { status: u16, body: String },

    #[error("Chart delete rejected: {status} - {body}")]
    DeleteRejected { status: u16, body: String },

    // ============ Index Errors ============
    #[error("Index parse error: {message}")]
    IndexParseError { message: String },

    #[error("Index merge failed: {message}")]
    IndexMergeFailed { message: String },

    // ============ Network Errors ============
    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    // ============ IO Errors ============
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Chart error: {0}")]
    Chart(#[from] slipway_core::CoreError),
}

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, RepoError>;

impl From<reqwest::Error> for RepoError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            RepoError::HttpError {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else if e.is_connect() {
            RepoError::NetworkError {
                message: format!("Connection failed: {}", e),
            }
        } else {
            RepoError::NetworkError {
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_yaml::Error> for RepoError {
    fn from(e: serde_yaml::Error) -> Self {
        RepoError::Serialization(e.to_string())
    }
}

