//! The built-in release steps
//!
//! The default release is an ordered list of these steps; the list itself
//! is data, so callers can run a subset or reorder when a target calls
//! for it.

use async_trait::async_trait;
use tracing::info;

use slipway_core::{package_chart, ReleaseKind, Version};
use slipway_docker::ImageRef;

use crate::context::ReleaseContext;
use crate::error::{ReleaseError, Result};
use crate::pipeline::Step;

/// The default step sequence: version, image build, image push, chart
/// package, chart upload, index refresh.
pub fn default_steps() -> Vec<Box<dyn Step>> {
    vec![
        Box::new(ResolveVersion),
        Box::new(BuildImage),
        Box::new(PushImage),
        Box::new(PackageChart),
        Box::new(UploadChart),
        Box::new(UpdateRepo),
    ]
}

/// Resolve the release version from the published history.
///
/// The latest published version comes from the chart repository's index.
/// A bump produces its successor; `--rebuild` reuses it unchanged. When
/// nothing was ever published, bumps start from 0.0.0 and a rebuild is an
/// error.
pub struct ResolveVersion;

#[async_trait]
impl Step for ResolveVersion {
    fn name(&self) -> &'static str {
        "resolve-version"
    }

    async fn run(&self, ctx: &mut ReleaseContext) -> Result<()> {
        let index = ctx
            .registry
            .fetch_index(&ctx.config.chart_repository)
            .await?;
        let latest = index.latest_version(&ctx.config.app).map(|v| Version::from(&v));

        let version = match latest {
            Some(latest) => latest.bump(ctx.kind),
            None if ctx.kind == ReleaseKind::Rebuild => {
                return Err(ReleaseError::NoPublishedVersion {
                    app: ctx.config.app.clone(),
                });
            }
            None => Version::default().bump(ctx.kind),
        };

        info!(version = %version, kind = %ctx.kind, "Resolved release version");
        ctx.version = Some(version);
        Ok(())
    }
}

/// Build the container image from the configured context directory
pub struct BuildImage;

#[async_trait]
impl Step for BuildImage {
    fn name(&self) -> &'static str {
        "build-image"
    }

    async fn run(&self, ctx: &mut ReleaseContext) -> Result<()> {
        let image = ImageRef::for_release(&ctx.config.image_repository, ctx.version()?);
        ctx.docker
            .build_image(&image.to_string(), &ctx.config.build_context)
            .await?;
        Ok(())
    }
}

/// Push the built image to its registry
pub struct PushImage;

#[async_trait]
impl Step for PushImage {
    fn name(&self) -> &'static str {
        "push-image"
    }

    async fn run(&self, ctx: &mut ReleaseContext) -> Result<()> {
        let image = ImageRef::for_release(&ctx.config.image_repository, ctx.version()?);
        ctx.docker
            .push_image(
                &image,
                &ctx.config.image_repository,
                &ctx.config.credential_helper,
            )
            .await?;
        Ok(())
    }
}

/// Package the chart source at the release version
pub struct PackageChart;

#[async_trait]
impl Step for PackageChart {
    fn name(&self) -> &'static str {
        "package-chart"
    }

    async fn run(&self, ctx: &mut ReleaseContext) -> Result<()> {
        let archive = package_chart(
            &ctx.config.chart_source,
            ctx.version()?,
            &ctx.config.chart_output,
            ctx.config.save_local,
        )?;

        info!(archive = %archive.display(), "Packaged chart");
        ctx.archive = Some(archive);
        Ok(())
    }
}

/// Upload the packaged archive to the configured chart repository
pub struct UploadChart;

#[async_trait]
impl Step for UploadChart {
    fn name(&self) -> &'static str {
        "upload-chart"
    }

    async fn run(&self, ctx: &mut ReleaseContext) -> Result<()> {
        let bytes = std::fs::read(ctx.archive()?)?;
        ctx.registry
            .upload_chart(bytes, &ctx.config.chart_repository)
            .await?;
        Ok(())
    }
}

/// Refresh the chart repository's cached index, so existence probes see
/// the freshly uploaded version
pub struct UpdateRepo;

#[async_trait]
impl Step for UpdateRepo {
    fn name(&self) -> &'static str {
        "update-repo"
    }

    async fn run(&self, ctx: &mut ReleaseContext) -> Result<()> {
        ctx.sync.update_repo(&ctx.config.chart_repository).await?;
        Ok(())
    }
}
