//! Container engine client
//!
//! Build, push, and remove images against the local Docker daemon. Build
//! and push responses are streamed; both streams are drained to completion
//! even on success, since the engine reports progress incrementally and an
//! unread stream can block it. Push errors arrive in-band as `{"error": ..}`
//! frames after the stream opens, so every drained frame is inspected.

use bollard::image::{BuildImageOptions, ListImagesOptions, PushImageOptions, RemoveImageOptions};
use bollard::Docker;
use futures::StreamExt;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use slipway_core::Version;

use crate::credentials::{self, RegistryAuth};
use crate::error::{DockerError, Result};

/// A tagged image name: repository plus tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub repository: String,
    pub tag: String,
}

impl ImageRef {
    /// Derive the image reference for a release: the configured repository
    /// tagged with the release version.
    pub fn for_release(repository: &str, version: Version) -> Self {
        Self {
            repository: repository.to_string(),
            tag: version.to_string(),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

/// Artifact builder over the local Docker daemon
pub struct DockerClient {
    docker: Docker,
}

impl DockerClient {
    /// Connect to the local Docker daemon
    pub fn new() -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }

    /// Create with a custom engine client
    pub fn with_client(docker: Docker) -> Self {
        Self { docker }
    }

    /// Build an image from a context directory.
    ///
    /// The context path may use the `~` home shorthand. The directory is
    /// tarred in-memory and submitted with the given tag; the build-info
    /// stream is drained to completion.
    pub async fn build_image(&self, tagged_name: &str, build_context: &Path) -> Result<()> {
        let context = expand_home(build_context);
        let tar = tar_directory(&context)?;

        info!(image = %tagged_name, context = %context.display(), "Building image");

        let options = BuildImageOptions {
            t: tagged_name.to_string(),
            rm: true,
            ..Default::default()
        };

        let mut stream = self
            .docker
            .build_image(options, None, Some(tar.into()));

        while let Some(frame) = stream.next().await {
            let info = frame.map_err(|e| DockerError::BuildFailed {
                message: e.to_string(),
            })?;

            if let Some(output) = info.stream {
                debug!(output = %output.trim_end(), "Build progress");
            }
            if let Some(error) = info.error {
                return Err(DockerError::BuildFailed { message: error });
            }
        }

        Ok(())
    }

    /// Push an image, resolving registry credentials through the
    /// configured credential helper.
    pub async fn push_image(
        &self,
        image: &ImageRef,
        repo: &str,
        credential_helper: &str,
    ) -> Result<()> {
        let auth: RegistryAuth = credentials::resolve(repo, credential_helper).await?;

        info!(image = %image, "Pushing image");

        let options = PushImageOptions {
            tag: image.tag.clone(),
        };

        let mut stream =
            self.docker
                .push_image(&image.repository, Some(options), Some(auth.into()));

        while let Some(frame) = stream.next().await {
            let info = frame.map_err(|e| DockerError::PushFailed {
                message: e.to_string(),
            })?;

            if let Some(status) = info.status {
                debug!(status = %status, "Push progress");
            }
            if let Some(error) = info.error {
                return Err(classify_push_error(error));
            }
        }

        Ok(())
    }

    /// Remove an image by exact reference.
    ///
    /// The lookup must match exactly one image; zero or several matches is
    /// an ambiguous reference and nothing is removed.
    pub async fn remove_image(&self, tagged_name: &str) -> Result<()> {
        let mut filters = HashMap::new();
        filters.insert("reference".to_string(), vec![tagged_name.to_string()]);

        let options = ListImagesOptions {
            filters,
            ..Default::default()
        };

        let images = self.docker.list_images(Some(options)).await?;

        if images.len() != 1 {
            return Err(DockerError::AmbiguousImageReference {
                reference: tagged_name.to_string(),
                count: images.len(),
            });
        }

        info!(image = %tagged_name, "Removing image");
        self.docker
            .remove_image(&images[0].id, None::<RemoveImageOptions>, None)
            .await?;

        Ok(())
    }
}

/// Map an in-band push error to its error kind.
///
/// Registries report authorization failures only in the drained response
/// body, not as a transport error.
fn classify_push_error(message: String) -> DockerError {
    let lowered = message.to_lowercase();
    if lowered.contains("unauthorized") || lowered.contains("denied") {
        DockerError::PushUnauthorized { message }
    } else {
        DockerError::PushFailed { message }
    }
}

/// Expand a leading `~` to the user's home directory
fn expand_home(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

/// Tar a build-context directory in-memory
fn tar_directory(dir: &Path) -> Result<Vec<u8>> {
    let mut builder = tar::Builder::new(Vec::new());
    builder.append_dir_all(".", dir)?;
    Ok(builder.into_inner()?)
}
