//! Opaque pagination cursors.
//!
//! The object store issues continuation tokens for resuming a listing. The
//! sampler treats them as opaque bytes; because the transport is a URL query
//! parameter, tokens round-trip through base64 at the handler boundary.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::error::CursorDecodeError;

/// An opaque resume position in the object store's key ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a store-issued continuation token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw store-issued token.
    pub fn token(&self) -> &str {
        &self.0
    }

    /// Consume the cursor, returning the raw token.
    pub fn into_token(self) -> String {
        self.0
    }

    /// Encode for transport in a URL query parameter.
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0.as_bytes())
    }

    /// Decode a transport-encoded cursor.
    ///
    /// Malformed input is a client error; it is never retried.
    pub fn decode(encoded: &str) -> Result<Self, CursorDecodeError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded.as_bytes())
            .map_err(|_| CursorDecodeError)?;
        let token = String::from_utf8(bytes).map_err(|_| CursorDecodeError)?;
        if token.is_empty() {
            return Err(CursorDecodeError);
        }
        Ok(Self(token))
    }
}
