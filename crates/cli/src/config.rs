//! Command-line and environment configuration.
//!
//! Every setting can come from a flag or its environment variable, so the
//! Lambda deployment configures the binary purely through its environment.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use release::{BranchName, OwnerName, RepositoryName, SecretId, SourceDescriptor};
use serde_json::Value;
use toolchain::{GitInstallation, ToolPackage, DEFAULT_PACKAGE_BUILD, DEFAULT_PACKAGE_FILE};
use workflow::DEFAULT_OAUTH_SECRET_ID;

#[derive(Debug, Parser)]
#[command(
    name = "release-trigger",
    version,
    about = "Starts deployment pipelines for repositories with unreleased changes"
)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per record.
    Json,
    /// Human-readable lines.
    Text,
}

#[derive(Debug, Args)]
pub struct Settings {
    /// Region used for the package repository and AWS clients.
    #[arg(long, env = "AWS_REGION")]
    pub region: String,

    /// Private scratch root for the git install tree and clones
    /// (defaults to the system temp directory).
    #[arg(long, env = "RELEASE_TRIGGER_SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,

    #[arg(long, env = "RELEASE_TRIGGER_PACKAGE_BUILD", default_value = DEFAULT_PACKAGE_BUILD)]
    pub package_build: String,

    #[arg(long, env = "RELEASE_TRIGGER_PACKAGE_FILE", default_value = DEFAULT_PACKAGE_FILE)]
    pub package_file: String,

    /// Base URL replacing `http://packages.<region>.amazonaws.com`.
    #[arg(long, env = "RELEASE_TRIGGER_PACKAGE_MIRROR")]
    pub package_mirror: Option<String>,

    #[arg(long, env = "RELEASE_TRIGGER_OAUTH_SECRET_ID", default_value = DEFAULT_OAUTH_SECRET_ID)]
    pub oauth_secret_id: String,

    #[arg(long, env = "RELEASE_TRIGGER_LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint; tracing export is disabled when unset.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Settings {
    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn tool_package(&self) -> ToolPackage {
        ToolPackage {
            region: self.region.clone(),
            build: self.package_build.clone(),
            file_name: self.package_file.clone(),
            mirror: self.package_mirror.clone(),
        }
    }

    pub fn installation(&self) -> GitInstallation {
        GitInstallation::new(self.scratch_root())
    }

    pub fn clones_root(&self) -> PathBuf {
        self.scratch_root().join("repos")
    }

    pub fn secret_id(&self) -> Result<SecretId> {
        SecretId::new(self.oauth_secret_id.as_str()).context("--oauth-secret-id must not be empty")
    }
}

#[derive(Debug, Subcommand)]
pub enum Mode {
    /// Serve events from the Lambda runtime API.
    Lambda,

    /// Handle a single event and print the outcome.
    Invoke {
        /// Event JSON, e.g. '{"pipelineName": "release-pipeline"}'.
        #[arg(long)]
        event: String,
    },

    /// Check one repository branch for unreleased changes.
    Probe {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        repo: String,
        #[arg(long)]
        branch: String,
    },
}

/// A [`Mode`] whose inputs have been validated.
#[derive(Debug, PartialEq)]
pub enum Task {
    Lambda,
    Invoke(Value),
    Probe(SourceDescriptor),
}

impl Mode {
    pub fn into_task(self) -> Result<Task> {
        match self {
            Mode::Lambda => Ok(Task::Lambda),
            Mode::Invoke { event } => {
                let event = serde_json::from_str(&event).context("--event is not valid JSON")?;
                Ok(Task::Invoke(event))
            }
            Mode::Probe {
                owner,
                repo,
                branch,
            } => Ok(Task::Probe(SourceDescriptor::new(
                OwnerName::new(owner).context("--owner must not be empty")?,
                RepositoryName::new(repo)
                    .context("--repo must be a single non-empty path component")?,
                BranchName::new(branch).context("--branch must not be empty")?,
            ))),
        }
    }
}
