//! [`SecretStore`] over AWS Secrets Manager.

use async_trait::async_trait;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, SdkError};
use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueError;
use aws_sdk_secretsmanager::Client;
use release::{SecretId, SecretStore, SecretStoreError, SecretValue};
use tracing::{debug, instrument};

/// Reads secrets with `GetSecretValue`. Only string secrets are supported.
#[derive(Debug, Clone)]
pub struct SecretsManagerStore {
    client: Client,
}

impl SecretsManagerStore {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self::from_client(Client::new(config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    #[instrument(skip(self, secret_id), fields(secret_id = %secret_id))]
    async fn get_secret(&self, secret_id: &SecretId) -> Result<SecretValue, SecretStoreError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id.as_str())
            .send()
            .await
            .map_err(|err| classify_get_error(secret_id, err))?;

        debug!("secret fetched");
        output
            .secret_string()
            .map(SecretValue::new)
            .ok_or_else(|| SecretStoreError::NotFound {
                secret_id: secret_id.clone(),
            })
    }
}

pub(crate) fn classify_get_error<R>(
    secret_id: &SecretId,
    err: SdkError<GetSecretValueError, R>,
) -> SecretStoreError
where
    R: std::fmt::Debug,
{
    if let Some(GetSecretValueError::ResourceNotFoundException(_)) = err.as_service_error() {
        return SecretStoreError::NotFound {
            secret_id: secret_id.clone(),
        };
    }
    SecretStoreError::Service {
        secret_id: secret_id.clone(),
        message: DisplayErrorContext(&err).to_string(),
    }
}
