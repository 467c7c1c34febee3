//! # Photostream
//!
//! A sampled photo listing service over S3-compatible object storage.
//!
//! This library provides the core functionality for serving randomized,
//! paginated photo listings from a cloud object store: each first page
//! starts at a pseudo-random position in the key space so repeated visits
//! surface different photos, while cursored pages resume deterministically.
//! Photos are served through a CDN behind time-limited HMAC-signed URLs.
//!
//! ## Features
//!
//! - **Discovery sampling**: Weighted seek strategies pick a random starting
//!   point in the lexicographic key space, with a full-scan fallback
//! - **Signed CDN URLs**: Per-photo HMAC-SHA256 URLs, key fetched once from
//!   the secret store and memoized
//! - **Favorites and tags**: DynamoDB-backed per-user markers, favorites
//!   surfaced first and backfilled into the first page
//! - **Direct uploads**: Presigned S3 PUT URLs scoped to image content types
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`store`] - Object, favorite and tag storage traits plus the S3 and
//!   DynamoDB implementations
//! - [`signing`] - CDN URL signer and the signing key cache
//! - [`sampler`] - The discovery sampler and pagination cursors
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```ignore
//! use photostream::{create_router, AppState, RouterConfig};
//!
//! let router = create_router(app_state, RouterConfig::new());
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

pub mod config;
pub mod error;
pub mod sampler;
pub mod server;
pub mod signing;
pub mod store;

// Re-export commonly used types
pub use config::{parse_seek_strategies, Config};
pub use error::{CursorDecodeError, SamplerError, SigningError, StoreError};
pub use sampler::{
    effective_limit, Cursor, DiscoverySampler, Page, PageParams, PhotoEntry, SamplerConfig,
    SeekPattern, SeekStrategy, ShufflePolicy, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, MIN_PAGE_LIMIT,
};
pub use server::{
    create_router, AppState, ApiError, CorsPolicy, ErrorBody, HealthResponse, Identity,
    OptionalIdentity, PaginationResponse, PhotoResponse, PhotosQueryParams, PhotosResponse,
    RouterConfig, IDENTITY_HEADER,
};
pub use signing::{
    CdnUrlSigner, PhotoUrlSigner, SecretSource, SecretsManagerSource, SigningKey, SigningKeyCache,
    UrlSigner,
};
pub use store::{
    create_s3_client, DynamoFavoriteStore, DynamoTagStore, FavoriteMarker, FavoriteStore,
    ListRequest, PhotoObject, PhotoPage, PhotoStore, S3PhotoStore, TagMarker, TagStore,
};
