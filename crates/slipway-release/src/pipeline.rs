//! Release pipeline execution
//!
//! A pipeline is an ordered list of named steps run strictly in sequence
//! against a shared context. The first failure aborts the run; steps are
//! individually re-runnable, not transactional as a group, and nothing is
//! rolled back on abort.

use async_trait::async_trait;
use tracing::{error, info};

use crate::context::ReleaseContext;
use crate::error::{ReleaseError, Result};

/// One named unit of release work
#[async_trait]
pub trait Step: Send + Sync {
    /// Step name, used in logs and failure reports
    fn name(&self) -> &'static str;

    /// Run the step against the shared context
    async fn run(&self, ctx: &mut ReleaseContext) -> Result<()>;
}

/// Pipeline progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Pending,
    Running(usize),
    Succeeded,
    Failed(usize),
}

/// Executes release steps in order
pub struct Pipeline {
    state: PipelineState,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Pending,
        }
    }

    /// Current pipeline state
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run every step in order, aborting on the first failure.
    ///
    /// The failing step is reported by name; already-completed steps'
    /// side effects (a pushed image, an uploaded chart) are left in place.
    pub async fn run(
        &mut self,
        ctx: &mut ReleaseContext,
        steps: &[Box<dyn Step>],
    ) -> Result<()> {
        for (i, step) in steps.iter().enumerate() {
            self.state = PipelineState::Running(i);
            info!(step = step.name(), "Running release step");

            if let Err(e) = step.run(ctx).await {
                self.state = PipelineState::Failed(i);
                error!(step = step.name(), error = %e, "Release step failed");
                return Err(ReleaseError::StepFailed {
                    step: step.name(),
                    source: Box::new(e),
                });
            }
        }

        self.state = PipelineState::Succeeded;
        info!(app = %ctx.config.app, "Release succeeded");
        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slipway_core::{ReleaseConfig, ReleaseKind};
    use slipway_docker::DockerClient;
    use slipway_repo::{IndexSynchronizer, RegistryClient, RepositoryFile};
    use std::sync::{Arc, Mutex};

    fn test_context() -> ReleaseContext {
        let config = ReleaseConfig {
            app: "foo".to_string(),
            target: "prod".to_string(),
            build_context: ".".into(),
            chart_source: "./deploy/foo".into(),
            chart_output: ".".into(),
            image_repository: "gcr.io/acme/foo".to_string(),
            chart_repository: "acme".to_string(),
            credential_helper: "gcloud".to_string(),
            save_local: false,
        };
        ReleaseContext::new(
            config,
            ReleaseKind::Minor,
            DockerClient::new().expect("client construction is lazy"),
            RegistryClient::new(RepositoryFile::default()),
            IndexSynchronizer::new(RepositoryFile::default()),
        )
    }

    struct RecordingStep {
        step_name: &'static str,
        fail: bool,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Step for RecordingStep {
        fn name(&self) -> &'static str {
            self.step_name
        }

        async fn run(&self, _ctx: &mut ReleaseContext) -> Result<()> {
            self.log.lock().unwrap().push(self.step_name);
            if self.fail {
                Err(ReleaseError::VersionNotResolved)
            } else {
                Ok(())
            }
        }
    }

    fn recording_steps(
        log: &Arc<Mutex<Vec<&'static str>>>,
        specs: &[(&'static str, bool)],
    ) -> Vec<Box<dyn Step>> {
        specs
            .iter()
            .copied()
            .map(|(step_name, fail)| {
                Box::new(RecordingStep {
                    step_name,
                    fail,
                    log: Arc::clone(log),
                }) as Box<dyn Step>
            })
            .collect()
    }

    #[tokio::test]
    async fn test_steps_run_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let steps = recording_steps(&log, &[("one", false), ("two", false), ("three", false)]);

        let mut pipeline = Pipeline::new();
        let mut ctx = test_context();
        pipeline.run(&mut ctx, &steps).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["one", "two", "three"]);
        assert_eq!(pipeline.state(), PipelineState::Succeeded);
    }

    #[tokio::test]
    async fn test_first_failure_aborts() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let steps = recording_steps(&log, &[("one", false), ("two", true), ("three", false)]);

        let mut pipeline = Pipeline::new();
        let mut ctx = test_context();
        let err = pipeline.run(&mut ctx, &steps).await.unwrap_err();

        // The failing step is named; later steps never ran
        assert!(matches!(err, ReleaseError::StepFailed { step: "two", .. }));
        assert_eq!(*log.lock().unwrap(), vec!["one", "two"]);
        assert_eq!(pipeline.state(), PipelineState::Failed(1));
    }

    #[tokio::test]
    async fn test_empty_step_list_succeeds() {
        let mut pipeline = Pipeline::new();
        assert_eq!(pipeline.state(), PipelineState::Pending);

        let mut ctx = test_context();
        pipeline.run(&mut ctx, &[]).await.unwrap();
        assert_eq!(pipeline.state(), PipelineState::Succeeded);
    }
}
