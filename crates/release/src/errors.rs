//! Error types for the release trigger domain.
//!
//! [`ReleaseTriggerError`] is what the orchestration layer returns to its
//! caller. Port-level errors ([`SecretStoreError`], [`OrchestratorError`],
//! [`ToolError`]) are produced by infrastructure adapters and wrapped on the
//! way up.

use thiserror::Error;

use crate::{PipelineName, SecretId};

// ---------------------------------------------------------------------------
// Port-level errors
// ---------------------------------------------------------------------------

/// Failure reading a secret from the secret store.
#[derive(Debug, Error)]
pub enum SecretStoreError {
    /// The secret does not exist or has no string value.
    #[error("Secret '{secret_id}' not found or has no string value")]
    NotFound {
        /// Identifier that was requested.
        secret_id: SecretId,
    },

    /// The store could not be reached or refused the request.
    #[error("Secret store request for '{secret_id}' failed: {message}")]
    Service {
        /// Identifier that was requested.
        secret_id: SecretId,
        /// Description of the failure as reported by the client.
        message: String,
    },
}

/// Failure asking the orchestration service to start a pipeline.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The service answered with an error (unknown pipeline, concurrency
    /// limit, validation failure, ...).
    ///
    /// This is the only variant the pipeline trigger suppresses.
    #[error("Orchestrator rejected start of '{pipeline}': {message}")]
    Rejected {
        /// Pipeline whose start was rejected.
        pipeline: PipelineName,
        /// Service error code, when one was returned.
        code: Option<String>,
        /// Description of the rejection.
        message: String,
    },

    /// No service response was received (connection, timeout, signing).
    #[error("Orchestrator unavailable while starting '{pipeline}': {message}")]
    Unavailable {
        /// Pipeline whose start was attempted.
        pipeline: PipelineName,
        /// Description of the transport failure.
        message: String,
    },

    /// The service accepted the request but returned no execution id.
    #[error("Orchestrator returned no execution id for '{pipeline}'")]
    MissingExecutionId {
        /// Pipeline that was started.
        pipeline: PipelineName,
    },
}

/// Failure launching an external tool.
///
/// A tool that runs and exits non-zero is *not* a [`ToolError`]; the exit
/// status is reported in [`crate::ToolOutput`] and interpreted by the caller.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The process could not be spawned or waited on.
    #[error("Failed to run '{program}': {source}")]
    Launch {
        /// Program that was being launched.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Orchestration-level errors
// ---------------------------------------------------------------------------

/// Errors returned by the release trigger workflow.
///
/// None of these are retried; every variant propagates to the platform.
#[derive(Debug, Error)]
pub enum ReleaseTriggerError {
    /// `git clone` exited non-zero.
    #[error("git clone error: {stderr}")]
    CloneFailed {
        /// Captured standard error of the clone command.
        stderr: String,
    },

    /// `git log` exited non-zero.
    #[error("git log error: {stderr}")]
    LogFailed {
        /// Captured standard error of the log command.
        stderr: String,
    },

    /// The inbound event lacks a required field.
    #[error("Missing required event field '{field}'")]
    MissingEventField {
        /// Name of the missing field.
        field: &'static str,
    },

    /// The inbound event carries a required field with an unusable value.
    #[error("Invalid value for event field '{field}': expected a non-empty string")]
    InvalidEventField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// Local scratch directory housekeeping failed.
    #[error("Scratch directory operation on '{path}' failed: {source}")]
    Scratch {
        /// Path being operated on.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The secret store could not supply the credential.
    #[error(transparent)]
    Secret(#[from] SecretStoreError),

    /// The orchestration service failed without answering.
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    /// An external tool could not be launched.
    #[error(transparent)]
    Tool(#[from] ToolError),
}
