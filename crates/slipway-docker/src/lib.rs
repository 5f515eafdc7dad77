//! Artifact builder for Slipway
//!
//! Builds a container image from a source-tree context, pushes it to a
//! registry authenticated through an external Docker credential helper, and
//! removes images by exact reference.

pub mod client;
pub mod credentials;
pub mod error;

pub use client::{DockerClient, ImageRef};
pub use credentials::{registry_host, RegistryAuth};
pub use error::{DockerError, Result};
