use thiserror::Error;

/// Errors from the object store and table store collaborators.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Downstream service call failed (S3, DynamoDB)
    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors from CDN URL signing.
#[derive(Debug, Clone, Error)]
pub enum SigningError {
    /// Signing key or key identifier is unavailable or misconfigured.
    /// Fatal for the whole request.
    #[error("signing configuration error: {0}")]
    Configuration(String),

    /// Failed to sign a single photo URL. Tolerated per item.
    #[error("failed to sign url for {key}: {message}")]
    PerItem { key: String, message: String },
}

/// A pagination token that could not be decoded.
///
/// Always a client error (HTTP 400), never a 500.
#[derive(Debug, Clone, Error)]
#[error("invalid pagination token")]
pub struct CursorDecodeError;

/// Errors produced while assembling a photo listing page.
#[derive(Debug, Clone, Error)]
pub enum SamplerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Signing(#[from] SigningError),
}
