//! CDN URL signing.
//!
//! Photos are private in the object store; clients fetch them through a CDN
//! that validates a time-limited HMAC signature on each URL. The signing key
//! is fetched once per process from the secret store and memoized behind a
//! single-flight cache.

mod key_cache;
mod url_signer;

pub use key_cache::{SecretSource, SecretsManagerSource, SigningKey, SigningKeyCache};
pub use url_signer::UrlSigner;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::SigningError;

/// Produces signed CDN URLs for photo keys.
///
/// A [`SigningError::Configuration`] means the signing key itself is
/// unavailable; [`SigningError::PerItem`] means one URL could not be signed.
#[async_trait]
pub trait PhotoUrlSigner: Send + Sync {
    async fn signed_url(&self, photo_key: &str) -> Result<String, SigningError>;
}

/// Production [`PhotoUrlSigner`] backed by the key cache.
pub struct CdnUrlSigner {
    base_url: String,
    ttl: Duration,
    keys: Arc<SigningKeyCache>,
}

impl CdnUrlSigner {
    /// Create a signer producing URLs under `base_url` valid for `ttl`.
    pub fn new(base_url: impl Into<String>, ttl: Duration, keys: Arc<SigningKeyCache>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ttl,
            keys,
        }
    }
}

#[async_trait]
impl PhotoUrlSigner for CdnUrlSigner {
    async fn signed_url(&self, photo_key: &str) -> Result<String, SigningError> {
        let key = self.keys.get().await?;
        let signer = UrlSigner::new(&key.key_id, &key.secret);

        let path = format!("/{}", photo_key.trim_start_matches('/'));
        Ok(signer.sign_url(&self.base_url, &path, self.ttl))
    }
}
