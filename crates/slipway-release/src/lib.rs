//! Release pipeline for Slipway
//!
//! Drives a release end to end: resolve the version, build and push the
//! container image, package and upload the chart, refresh the registry
//! index. Steps run strictly in order against a shared [`ReleaseContext`];
//! the first failure aborts the run with no compensation.

pub mod context;
pub mod error;
pub mod pipeline;
pub mod steps;

pub use context::ReleaseContext;
pub use error::{ReleaseError, Result};
pub use pipeline::{Pipeline, PipelineState, Step};
pub use steps::default_steps;
