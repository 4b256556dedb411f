//! Release trigger orchestration.
//!
//! Sequences calls between the domain rules in [`release`] and the
//! infrastructure behind its port traits:
//!
//! - [`CredentialFetcher`] — reads the OAuth token from the secret store.
//! - [`RepositoryProber`] — shallow clone plus release-marker check.
//! - [`PipelineTrigger`] — starts a pipeline, reporting rejections as values.
//! - [`EventHandler`] — the platform entry point.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Nothing here talks to AWS or spawns processes
//! directly; everything goes through the `release` ports.

mod credentials;
mod handler;
mod prober;
mod trigger;

#[cfg(test)]
mod testing;

pub use credentials::{CredentialFetcher, DEFAULT_OAUTH_SECRET_ID};
pub use handler::{EventHandler, PIPELINE_NAME_FIELD};
pub use prober::RepositoryProber;
pub use trigger::PipelineTrigger;
