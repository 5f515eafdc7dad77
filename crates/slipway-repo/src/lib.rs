//! Chart repository support for Slipway
//!
//! This crate provides the chart-registry side of a release:
//!
//! - **Repository file**: the persisted list of named repositories
//! - **Registry client**: upload/remove/probe against the `/api/charts` API
//! - **Index**: deterministic chart-index model with idempotent merge
//! - **Synchronizer**: concurrent cached-index refresh with failure
//!   isolation
//!
//! The registry client's existence probe is deliberately best-effort: a
//! registry that cannot be reached reads as "chart absent", never as an
//! error.

pub mod config;
pub mod error;
pub mod index;
pub mod registry;
pub mod sync;

// Re-exports for convenience
pub use config::{RepositoryEntry, RepositoryFile, LOCAL_REPOSITORY};
pub use error::{RepoError, Result};
pub use index::{ChartEntry, IndexFile};
pub use registry::RegistryClient;
pub use sync::IndexSynchronizer;
