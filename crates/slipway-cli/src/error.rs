//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Config file missing/invalid, unknown target, or bad flag selection
    #[error("Config error: {message}")]
    #[diagnostic(code(slipway::cli::config))]
    Config { message: String },

    /// Listing published versions failed
    #[error("{message}")]
    #[diagnostic(code(slipway::cli::get))]
    Get { message: String },

    /// The release pipeline failed
    #[error("Release failed: {message}")]
    #[diagnostic(code(slipway::cli::release))]
    Release { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(slipway::cli::io))]
    Io { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Get { .. } => exit_codes::GET_ERROR,
            CliError::Release { .. } => exit_codes::ERROR,
            CliError::Io { .. } => exit_codes::ERROR,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a get error
    pub fn get(message: impl Into<String>) -> Self {
        Self::Get {
            message: message.into(),
        }
    }

    /// Create a release error
    pub fn release(message: impl Into<String>) -> Self {
        Self::Release {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_failures_exit_with_2() {
        assert_eq!(CliError::get("registry unreachable").exit_code(), 2);
    }

    #[test]
    fn test_release_failures_are_nonzero() {
        assert_ne!(CliError::release("step failed").exit_code(), 0);
        assert_ne!(CliError::config("no target").exit_code(), 0);
    }
}
