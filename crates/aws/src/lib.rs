//! AWS infrastructure adapter.
//!
//! Implements the cloud-facing ports defined in the [`release`] crate:
//!
//! - [`SecretsManagerStore`] — [`release::SecretStore`] over Secrets Manager.
//! - [`CodePipelineOrchestrator`] — [`release::PipelineOrchestrator`] over
//!   CodePipeline.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Credential resolution, request signing, and SDK error
//! classification live here; the [`release`] crate never sees SDK types.

mod pipelines;
mod secrets;

pub use aws_config::SdkConfig;
pub use pipelines::CodePipelineOrchestrator;
pub use secrets::SecretsManagerStore;

/// Loads SDK configuration for `region`, resolving credentials from the
/// standard provider chain (environment, profile, container or Lambda role).
pub async fn load_sdk_config(region: &str) -> SdkConfig {
    aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()))
        .load()
        .await
}
