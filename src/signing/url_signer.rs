//! HMAC-SHA256 URL signing.
//!
//! # Signing Scheme
//!
//! URLs are signed by computing an HMAC-SHA256 over the path and query
//! parameters (excluding `sig`). This binds signatures to the full request
//! path and query:
//!
//! ```text
//! signature = HMAC-SHA256(secret_key, "{path}?{canonical_query}")
//! ```
//!
//! The canonical query always includes the key identifier (`kid`) and the
//! expiry (`exp`), so the CDN can select the right key and reject stale URLs:
//!
//! ```text
//! /2020_June/x.jpg?kid=key-2024&exp=1735689600&sig=abc123...
//! ```
//!
//! # Security Properties
//!
//! - **Path + query binding**: tampering with the key invalidates the signature
//! - **Time-limited**: signatures expire after a configurable TTL
//! - **Constant-time comparison**: verification uses constant-time comparison
//!   to prevent timing attacks

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use url::form_urlencoded;

type HmacSha256 = Hmac<Sha256>;

/// Signed URL generator using HMAC-SHA256 with a named key.
#[derive(Clone)]
pub struct UrlSigner {
    /// Identifier of the signing key, carried in the `kid` parameter
    key_id: String,

    /// Secret key material for HMAC computation
    secret: Vec<u8>,
}

impl UrlSigner {
    /// Create a new signer.
    ///
    /// # Arguments
    ///
    /// * `key_id` - Public identifier of the key (included in signed URLs)
    /// * `secret` - The secret key used for HMAC computation. Should be at
    ///   least 32 bytes for security.
    pub fn new(key_id: impl Into<String>, secret: impl AsRef<[u8]>) -> Self {
        Self {
            key_id: key_id.into(),
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Get the key identifier.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Sign a path with an expiry duration.
    ///
    /// Returns the hex-encoded signature and the expiry timestamp
    /// (Unix epoch seconds).
    pub fn sign(&self, path: &str, ttl: Duration) -> (String, u64) {
        let expiry = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            + ttl.as_secs();

        (self.sign_with_expiry(path, expiry), expiry)
    }

    /// Sign a path with a specific expiry timestamp.
    pub fn sign_with_expiry(&self, path: &str, expiry: u64) -> String {
        let message = self.signature_base(path, expiry);

        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size");
        mac.update(message.as_bytes());

        hex::encode(mac.finalize().into_bytes())
    }

    /// Produce a complete signed URL: `{base_url}{path}?kid=..&exp=..&sig=..`.
    pub fn sign_url(&self, base_url: &str, path: &str, ttl: Duration) -> String {
        let (signature, expiry) = self.sign(path, ttl);

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair("kid", &self.key_id);
        serializer.append_pair("exp", &expiry.to_string());
        serializer.append_pair("sig", &signature);

        format!("{}{}?{}", base_url, path, serializer.finish())
    }

    /// Verify a signature for a path and expiry.
    ///
    /// Returns false when the signature is expired, malformed, or does not
    /// match. Comparison is constant-time.
    pub fn verify(&self, path: &str, signature: &str, expiry: u64) -> bool {
        let current_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        if current_time > expiry {
            return false;
        }

        let provided = match hex::decode(signature) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };

        let expected = match hex::decode(self.sign_with_expiry(path, expiry)) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };

        provided.ct_eq(&expected).into()
    }

    fn signature_base(&self, path: &str, expiry: u64) -> String {
        // Canonical query in parameter-name order: exp, kid
        format!("{}?exp={}&kid={}", path, expiry, self.key_id)
    }
}
