//! Access to the OAuth token used for authenticated clones.

use std::sync::Arc;

use release::{ReleaseTriggerError, SecretId, SecretStore, SecretValue};
use tracing::instrument;

/// Secret holding the GitHub OAuth token used for cloning.
pub const DEFAULT_OAUTH_SECRET_ID: &str = "/codebuild/github/oauth";

/// Fetches the repository OAuth token from the secret store.
///
/// Every call goes to the store; tokens are never cached.
pub struct CredentialFetcher {
    store: Arc<dyn SecretStore>,
    secret_id: SecretId,
}

impl CredentialFetcher {
    /// Reads the token from `secret_id` in `store`.
    pub fn new(store: Arc<dyn SecretStore>, secret_id: SecretId) -> Self {
        Self { store, secret_id }
    }

    /// Fetches the current token. Store failures are returned unchanged.
    #[instrument(skip(self), fields(secret_id = %self.secret_id))]
    pub async fn get_oauth_token(&self) -> Result<SecretValue, ReleaseTriggerError> {
        Ok(self.store.get_secret(&self.secret_id).await?)
    }
}
