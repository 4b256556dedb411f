//! Detects unreleased commits by shallow-cloning a branch and reading the
//! subject of its tip commit.
//!
//! The release process finishes by committing a development version bump
//! with a fixed subject (see [`release::RELEASE_MARKER_PREFIX`]). If that
//! commit is still the tip, nothing has landed since the last release.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use release::{CommitSubject, ReleaseTriggerError, SourceDescriptor, ToolRunner};
use toolchain::GitInstallation;
use tracing::{debug, info, instrument};

use crate::CredentialFetcher;

/// Environment variable carrying the token into the clone process only.
const TOKEN_ENV: &str = "RELEASE_TRIGGER_GIT_TOKEN";

/// Inline credential helper answering `get` requests from [`TOKEN_ENV`], so
/// the token never appears in the URL or argument vector.
const CREDENTIAL_HELPER: &str = "!f() { test \"$1\" = get || return 0; \
    echo username=x-access-token; echo \"password=$RELEASE_TRIGGER_GIT_TOKEN\"; }; f";

pub struct RepositoryProber {
    credentials: CredentialFetcher,
    runner: Arc<dyn ToolRunner>,
    installation: GitInstallation,
    clones_root: PathBuf,
}

impl RepositoryProber {
    /// `clones_root` holds one directory per repository name; it is created
    /// on first use.
    pub fn new(
        credentials: CredentialFetcher,
        runner: Arc<dyn ToolRunner>,
        installation: GitInstallation,
        clones_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            credentials,
            runner,
            installation,
            clones_root: clones_root.into(),
        }
    }

    /// Local directory the source is cloned into.
    pub fn clone_dir(&self, source: &SourceDescriptor) -> PathBuf {
        self.clones_root.join(source.repo.as_str())
    }

    /// Returns `true` if the tip of `source.branch` is anything other than a
    /// release-marker commit.
    #[instrument(skip(self, source), fields(source = %source))]
    pub async fn changes_since_last_release(
        &self,
        source: &SourceDescriptor,
    ) -> Result<bool, ReleaseTriggerError> {
        let dir = self.shallow_clone(source).await?;
        let subject = self.latest_subject(&dir).await?;
        info!("most recent commit: {subject}");
        Ok(subject.has_unreleased_changes())
    }

    async fn shallow_clone(
        &self,
        source: &SourceDescriptor,
    ) -> Result<PathBuf, ReleaseTriggerError> {
        let dir = self.clone_dir(source);
        remove_stale_clone(&dir).await?;
        tokio::fs::create_dir_all(&self.clones_root)
            .await
            .map_err(|err| ReleaseTriggerError::Scratch {
                path: self.clones_root.display().to_string(),
                source: err,
            })?;

        let token = self.credentials.get_oauth_token().await?;
        let helper = format!("credential.helper={CREDENTIAL_HELPER}");
        let url = source.clone_url();
        let dest = dir.display().to_string();

        let invocation = self
            .installation
            .git()
            // An empty value resets any helper list inherited from config.
            .args(["-c", "credential.helper=", "-c", helper.as_str()])
            .args([
                "clone",
                "--depth",
                "1",
                "--single-branch",
                "--branch",
                source.branch.as_str(),
                url.as_str(),
                dest.as_str(),
            ])
            .current_dir(&self.clones_root)
            .env(TOKEN_ENV, token.expose());

        let output = self.runner.run(invocation).await?;
        if !output.success() {
            return Err(ReleaseTriggerError::CloneFailed {
                stderr: output.stderr,
            });
        }
        debug!(dir = %dir.display(), "cloned");
        Ok(dir)
    }

    async fn latest_subject(&self, dir: &Path) -> Result<CommitSubject, ReleaseTriggerError> {
        let invocation = self
            .installation
            .git()
            .args(["log", "-1", "--pretty=%s"])
            .current_dir(dir);

        let output = self.runner.run(invocation).await?;
        if !output.success() {
            return Err(ReleaseTriggerError::LogFailed {
                stderr: output.stderr,
            });
        }
        Ok(CommitSubject::new(output.stdout.trim_end_matches(['\r', '\n'])))
    }
}

async fn remove_stale_clone(dir: &Path) -> Result<(), ReleaseTriggerError> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {
            debug!(dir = %dir.display(), "removed previous clone");
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ReleaseTriggerError::Scratch {
            path: dir.display().to_string(),
            source,
        }),
    }
}
