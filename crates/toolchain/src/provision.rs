//! One-time installation of the pinned git package.

use std::path::Path;
use std::sync::Arc;

use release::{ToolError, ToolInvocation, ToolOutput, ToolRunner};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{info, instrument, warn};

use crate::{GitInstallation, ToolPackage};

/// Failures that abort provisioning. None of them are recoverable: without
/// the binary no probe can run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Failed to download '{url}': {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Download of '{url}' returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Signature check failed for '{artifact}': {output}")]
    SignatureRejected { artifact: String, output: String },

    #[error("Unpacking '{artifact}' failed: {output}")]
    UnpackFailed { artifact: String, output: String },

    #[error("Unpacked package does not contain '{path}'")]
    BinaryMissing { path: String },

    #[error("Filesystem operation on '{path}' failed: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Tool(#[from] ToolError),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ProvisionError + '_ {
    move |source| ProvisionError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn combined(output: &ToolOutput) -> String {
    format!("{}{}", output.stdout, output.stderr).trim().to_string()
}

/// Installs git into a scratch root at most once per process.
///
/// The bootstrap creates a single provisioner and calls
/// [`Provisioner::ensure_tool_installed`] before serving events. Concurrent
/// callers wait on the same attempt; a failed attempt leaves the cell empty.
pub struct Provisioner {
    package: ToolPackage,
    installation: GitInstallation,
    http: reqwest::Client,
    runner: Arc<dyn ToolRunner>,
    installed: OnceCell<GitInstallation>,
}

impl Provisioner {
    pub fn new(
        package: ToolPackage,
        installation: GitInstallation,
        runner: Arc<dyn ToolRunner>,
    ) -> Self {
        Self {
            package,
            installation,
            http: reqwest::Client::new(),
            runner,
            installed: OnceCell::new(),
        }
    }

    /// Returns the installation, downloading and unpacking the package first
    /// if this process has not done so yet.
    pub async fn ensure_tool_installed(&self) -> Result<&GitInstallation, ProvisionError> {
        self.installed.get_or_try_init(|| self.install()).await
    }

    #[instrument(
        skip(self),
        fields(package = %self.package.file_name, root = %self.installation.root().display())
    )]
    async fn install(&self) -> Result<GitInstallation, ProvisionError> {
        let binary = self.installation.git_binary();
        if tokio::fs::try_exists(&binary).await.unwrap_or(false) {
            info!(path = %binary.display(), "git already present, skipping install");
            return Ok(self.installation.clone());
        }

        warn!("installing git");

        let root = self.installation.root();
        tokio::fs::create_dir_all(root).await.map_err(io_error(root))?;

        let artifact = root.join(&self.package.file_name);
        let url = self.package.download_url();
        self.download(&url, &artifact).await?;
        self.verify(&artifact).await?;
        self.unpack(&artifact).await?;
        tokio::fs::remove_file(&artifact)
            .await
            .map_err(io_error(&artifact))?;

        if !tokio::fs::try_exists(&binary).await.unwrap_or(false) {
            return Err(ProvisionError::BinaryMissing {
                path: binary.display().to_string(),
            });
        }

        let home = self.installation.home_dir();
        tokio::fs::create_dir_all(&home).await.map_err(io_error(&home))?;

        info!(path = %binary.display(), "git installed");
        Ok(self.installation.clone())
    }

    async fn download(&self, url: &str, artifact: &Path) -> Result<(), ProvisionError> {
        let download_error = |source| ProvisionError::Download {
            url: url.to_string(),
            source,
        };

        let response = self.http.get(url).send().await.map_err(download_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProvisionError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(download_error)?;
        tokio::fs::write(artifact, &body)
            .await
            .map_err(io_error(artifact))?;
        info!(url, bytes = body.len(), "package downloaded");
        Ok(())
    }

    async fn verify(&self, artifact: &Path) -> Result<(), ProvisionError> {
        let output = self
            .runner
            .run(ToolInvocation::new("rpm").arg("-K").arg(artifact.display().to_string()))
            .await?;

        if !output.success() {
            return Err(ProvisionError::SignatureRejected {
                artifact: artifact.display().to_string(),
                output: combined(&output),
            });
        }
        Ok(())
    }

    async fn unpack(&self, artifact: &Path) -> Result<(), ProvisionError> {
        let output = self
            .runner
            .run_piped(
                ToolInvocation::new("rpm2cpio").arg(artifact.display().to_string()),
                ToolInvocation::new("cpio")
                    .arg("-idm")
                    .current_dir(self.installation.root()),
            )
            .await?;

        if !output.success() {
            return Err(ProvisionError::UnpackFailed {
                artifact: artifact.display().to_string(),
                output: combined(&output),
            });
        }
        Ok(())
    }
}
