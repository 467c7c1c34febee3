//! Signing key retrieval and the process-lifetime single-flight cache.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::info;

use crate::error::SigningError;

/// The CDN signing key: a public identifier plus secret key material.
#[derive(Debug, Clone)]
pub struct SigningKey {
    pub key_id: String,
    pub secret: Vec<u8>,
}

/// Secret store collaborator that can produce the signing key.
#[async_trait]
pub trait SecretSource: Send + Sync {
    async fn fetch_signing_key(&self) -> Result<SigningKey, SigningError>;
}

// =============================================================================
// Secrets Manager Source
// =============================================================================

/// AWS Secrets Manager implementation of [`SecretSource`].
///
/// Expects a JSON secret of the form `{"keyId": "...", "secret": "..."}`.
#[derive(Clone)]
pub struct SecretsManagerSource {
    client: aws_sdk_secretsmanager::Client,
    secret_id: String,
}

impl SecretsManagerSource {
    pub fn new(client: aws_sdk_secretsmanager::Client, secret_id: String) -> Self {
        Self { client, secret_id }
    }

    /// Get the configured secret identifier.
    pub fn secret_id(&self) -> &str {
        &self.secret_id
    }
}

#[derive(serde::Deserialize)]
struct SecretPayload {
    #[serde(rename = "keyId")]
    key_id: String,
    secret: String,
}

#[async_trait]
impl SecretSource for SecretsManagerSource {
    async fn fetch_signing_key(&self) -> Result<SigningKey, SigningError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(&self.secret_id)
            .send()
            .await
            .map_err(|e| SigningError::Configuration(e.to_string()))?;

        let raw = output.secret_string().ok_or_else(|| {
            SigningError::Configuration(format!("secret {} has no string value", self.secret_id))
        })?;

        let payload: SecretPayload = serde_json::from_str(raw).map_err(|e| {
            SigningError::Configuration(format!("secret {} is malformed: {}", self.secret_id, e))
        })?;

        Ok(SigningKey {
            key_id: payload.key_id,
            secret: payload.secret.into_bytes(),
        })
    }
}

// =============================================================================
// Single-Flight Cache
// =============================================================================

/// Process-lifetime cache of the signing key.
///
/// The first caller pays the fetch cost; concurrent first-callers await the
/// same in-flight fetch rather than issuing duplicates. There is no expiry:
/// a rotated key takes effect only in a fresh process instance. Failed
/// fetches are not cached, so the next caller retries.
pub struct SigningKeyCache {
    source: Arc<dyn SecretSource>,
    cell: OnceCell<SigningKey>,
}

impl SigningKeyCache {
    pub fn new(source: Arc<dyn SecretSource>) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    /// Get the signing key, fetching it on first use.
    pub async fn get(&self) -> Result<&SigningKey, SigningError> {
        self.cell
            .get_or_try_init(|| async {
                let key = self.source.fetch_signing_key().await?;
                info!(key_id = %key.key_id, "Loaded CDN signing key");
                Ok(key)
            })
            .await
    }
}
