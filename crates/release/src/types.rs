//! Shared value types for the release trigger domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! behaviour: the release-marker rule lives on [`CommitSubject`], and
//! [`SecretValue`] keeps credential material out of formatted output.

use serde::{Deserialize, Serialize};

use crate::{BranchName, ExecutionId, OwnerName, PipelineName, RepositoryName};

// ---------------------------------------------------------------------------
// Repository coordinates
// ---------------------------------------------------------------------------

/// Identifies a remote repository and the branch to inspect.
///
/// Immutable once constructed; the prober never rewrites any part of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Account or organisation owning the repository.
    pub owner: OwnerName,
    /// Repository name.
    pub repo: RepositoryName,
    /// Branch to clone.
    pub branch: BranchName,
}

impl SourceDescriptor {
    /// Creates a new [`SourceDescriptor`].
    pub fn new(owner: OwnerName, repo: RepositoryName, branch: BranchName) -> Self {
        Self {
            owner,
            repo,
            branch,
        }
    }

    /// Returns the credential-free HTTPS clone URL for this repository.
    pub fn clone_url(&self) -> String {
        format!("https://github.com/{}/{}.git", self.owner, self.repo)
    }
}

impl std::fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.branch)
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// A secret string fetched from the secret store.
///
/// Deliberately has no `Display` and a redacted `Debug`; the raw value is only
/// reachable through [`SecretValue::expose`].
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue(String);

impl SecretValue {
    /// Wraps a raw secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw secret. Callers must not log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretValue(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// Release detection
// ---------------------------------------------------------------------------

/// Subject prefix of the commit left behind by the release process when it
/// bumps the development version.
pub const RELEASE_MARKER_PREFIX: &str = "update development version to v";

/// Subject line of the most recent commit on a branch.
///
/// May be empty; an empty subject is never a release marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSubject(String);

impl CommitSubject {
    /// Wraps raw `git log --pretty=%s` output.
    pub fn new(subject: impl Into<String>) -> Self {
        Self(subject.into())
    }

    /// Returns the subject as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this commit was written by the release process.
    pub fn is_release_marker(&self) -> bool {
        self.0.starts_with(RELEASE_MARKER_PREFIX)
    }

    /// Returns `true` if commits exist on the branch that have not been
    /// released yet.
    pub fn has_unreleased_changes(&self) -> bool {
        !self.is_release_marker()
    }
}

impl std::fmt::Display for CommitSubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Trigger outcome
// ---------------------------------------------------------------------------

/// Result of asking the orchestration service to start a pipeline.
///
/// A rejected start is a value, not an error: the caller decides whether to
/// surface it. Serialised as the invocation response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum TriggerOutcome {
    /// The pipeline execution was started.
    Started {
        /// Pipeline that was started.
        pipeline: PipelineName,
        /// Identifier assigned by the orchestration service.
        execution_id: ExecutionId,
    },
    /// The orchestration service refused to start the pipeline.
    Failed {
        /// Pipeline that could not be started.
        pipeline: PipelineName,
        /// Service-provided description of the failure.
        reason: String,
    },
}

impl TriggerOutcome {
    /// Returns `true` for [`TriggerOutcome::Started`].
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }

    /// Returns the pipeline this outcome refers to.
    pub fn pipeline(&self) -> &PipelineName {
        match self {
            Self::Started { pipeline, .. } | Self::Failed { pipeline, .. } => pipeline,
        }
    }
}
