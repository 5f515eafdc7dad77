//! Registry credential resolution via Docker credential helpers
//!
//! A credential helper is an external `docker-credential-<suffix>` program
//! speaking the docker-credential-helpers protocol: it reads a server URL on
//! stdin and answers `get` with a `{ServerURL, Username, Secret}` JSON
//! object on stdout.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{DockerError, Result};

/// Resolved registry credentials
#[derive(Debug, Clone, Serialize)]
pub struct RegistryAuth {
    pub username: String,
    pub password: String,
    #[serde(rename = "serveraddress")]
    pub server_address: String,
}

impl RegistryAuth {
    /// Encode as the registry auth header value: a URL-safe base64
    /// encoding of the JSON credential blob.
    pub fn header(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(base64::engine::general_purpose::URL_SAFE.encode(json))
    }
}

impl From<RegistryAuth> for bollard::auth::DockerCredentials {
    fn from(auth: RegistryAuth) -> Self {
        Self {
            username: Some(auth.username),
            password: Some(auth.password),
            serveraddress: Some(auth.server_address),
            ..Default::default()
        }
    }
}

/// Credential helper `get` response
#[derive(Debug, Deserialize)]
struct HelperOutput {
    #[serde(rename = "Username")]
    username: String,
    #[serde(rename = "Secret")]
    secret: String,
}

/// Derive the registry host from an image repository path.
///
/// The host is the substring before the first path separator, e.g.
/// `gcr.io` for `gcr.io/acme/foo`.
pub fn registry_host(repo: &str) -> &str {
    repo.split('/').next().unwrap_or(repo)
}

/// Resolve credentials for an image repository through a credential helper.
///
/// Invokes `docker-credential-<helper>` against `https://<host>` where
/// `host` is the repository's registry host.
pub async fn resolve(repo: &str, helper: &str) -> Result<RegistryAuth> {
    let server = format!("https://{}", registry_host(repo));
    let program = format!("docker-credential-{}", helper);

    let mut child = Command::new(&program)
        .arg("get")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| DockerError::CredentialHelper {
            helper: helper.to_string(),
            message: format!("failed to spawn {}: {}", program, e),
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(server.as_bytes()).await?;
    }

    let output = child.wait_with_output().await?;
    if !output.status.success() {
        return Err(DockerError::CredentialHelper {
            helper: helper.to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let parsed: HelperOutput =
        serde_json::from_slice(&output.stdout).map_err(|e| DockerError::CredentialHelper {
            helper: helper.to_string(),
            message: format!("invalid helper output: {}", e),
        })?;

    Ok(RegistryAuth {
        username: parsed.username,
        password: parsed.secret,
        server_address: server,
    })
}
