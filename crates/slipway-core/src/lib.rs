//! Core types for Slipway
//!
//! Versions and bump selection, release configuration, and chart loading
//! and packaging. Everything here is synchronous and filesystem-local; the
//! network-facing pieces live in `slipway-docker` and `slipway-repo`.

pub mod archive;
pub mod chart;
pub mod config;
pub mod error;
pub mod version;

pub use archive::{local_cache_dir, package_chart, read_chart_from_archive};
pub use chart::{Chart, LoadedChart, Maintainer, Requirement, Requirements};
pub use config::{Config, Deployment, ReleaseConfig, CONFIG_FILE};
pub use error::{CoreError, Result};
pub use version::{ReleaseKind, Version};
