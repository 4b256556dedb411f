//! Core domain for the release trigger.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type, error type, and port trait used by the workspace. Infrastructure
//! crates implement the traits defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`PipelineName`, `RepositoryName`, etc.) |
//! | [`types`] | Value types (`SourceDescriptor`, `CommitSubject`, `TriggerOutcome`, etc.) |
//! | [`errors`] | Workflow and port error types |
//! | [`ports`] | `SecretStore`, `PipelineOrchestrator`, `ToolRunner` |

pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{OrchestratorError, ReleaseTriggerError, SecretStoreError, ToolError};
pub use identifiers::{
    BranchName, ExecutionId, InvocationId, OwnerName, PipelineName, RepositoryName, SecretId,
};
pub use ports::{PipelineOrchestrator, SecretStore, ToolInvocation, ToolOutput, ToolRunner};
pub use types::{
    CommitSubject, SecretValue, SourceDescriptor, TriggerOutcome, RELEASE_MARKER_PREFIX,
};
