//! Shared release context
//!
//! One context per release run, passed by reference into every step. The
//! resolved configuration is read-only; the version and archive path are
//! written once by their producing steps and read by everything downstream.

use std::path::PathBuf;

use slipway_core::{ReleaseConfig, ReleaseKind, Version};
use slipway_docker::DockerClient;
use slipway_repo::{IndexSynchronizer, RegistryClient};

use crate::error::{ReleaseError, Result};

/// Shared state for one release run
pub struct ReleaseContext {
    /// Resolved, read-only release configuration
    pub config: ReleaseConfig,

    /// Version-bump strategy for this run
    pub kind: ReleaseKind,

    /// Release version, set by the version step and immutable after
    pub version: Option<Version>,

    /// Packaged chart archive path, set by the package step
    pub archive: Option<PathBuf>,

    /// Artifact builder
    pub docker: DockerClient,

    /// Chart registry client
    pub registry: RegistryClient,

    /// Index synchronizer
    pub sync: IndexSynchronizer,
}

impl ReleaseContext {
    pub fn new(
        config: ReleaseConfig,
        kind: ReleaseKind,
        docker: DockerClient,
        registry: RegistryClient,
        sync: IndexSynchronizer,
    ) -> Self {
        Self {
            config,
            kind,
            version: None,
            archive: None,
            docker,
            registry,
            sync,
        }
    }

    /// The resolved release version; an error before the version step ran
    pub fn version(&self) -> Result<Version> {
        self.version.ok_or(ReleaseError::VersionNotResolved)
    }

    /// The packaged archive path; an error before the package step ran
    pub fn archive(&self) -> Result<&PathBuf> {
        self.archive.as_ref().ok_or(ReleaseError::ChartNotPackaged)
    }
}
