//! Storage collaborator traits and data types.
//!
//! The backend delegates every hard operation to a managed service behind a
//! trait: photo objects live in an object store ([`PhotoStore`]), favorite
//! and tag markers in a key-sorted table store ([`FavoriteStore`],
//! [`TagStore`]). The traits keep the handlers and the discovery sampler
//! testable against in-memory implementations.

mod dynamo;
mod s3;

pub use dynamo::{DynamoFavoriteStore, DynamoTagStore};
pub use s3::{create_s3_client, S3PhotoStore};

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

// =============================================================================
// Photo Store
// =============================================================================

/// A single photo object as observed in a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoObject {
    /// Object key: a path-like string, unique within the store
    pub key: String,

    /// Last-modified timestamp (Unix epoch seconds), when the store reports it
    pub last_modified: Option<i64>,

    /// Object size in bytes, when the store reports it
    pub size: Option<u64>,
}

impl PhotoObject {
    /// Create a photo object with only a key (metadata unknown).
    pub fn from_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            last_modified: None,
            size: None,
        }
    }
}

/// Parameters for one listing call against the object store.
///
/// `cursor` and `start_after` are mutually exclusive: a cursor resumes an
/// earlier listing exactly, `start_after` seeks to a lower bound in the
/// lexicographic key ordering (used by the discovery sampler).
#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    /// Maximum number of objects to return
    pub limit: u32,

    /// Store-issued continuation token from a previous page
    pub cursor: Option<String>,

    /// Lexicographic lower bound to seek to (exclusive)
    pub start_after: Option<String>,
}

impl ListRequest {
    /// List from the true beginning of the key space.
    pub fn from_start(limit: u32) -> Self {
        Self {
            limit,
            cursor: None,
            start_after: None,
        }
    }

    /// Resume exactly from a store-issued continuation token.
    pub fn resume(limit: u32, cursor: String) -> Self {
        Self {
            limit,
            cursor: Some(cursor),
            start_after: None,
        }
    }

    /// Seek to a lower bound in the key ordering.
    pub fn seek(limit: u32, start_after: String) -> Self {
        Self {
            limit,
            cursor: None,
            start_after: Some(start_after),
        }
    }
}

/// One page of an object listing.
#[derive(Debug, Clone, Default)]
pub struct PhotoPage {
    /// Objects in lexicographic key order
    pub photos: Vec<PhotoObject>,

    /// Opaque continuation token for the next page (None if no more pages)
    pub next_cursor: Option<String>,

    /// Whether more objects exist beyond this page
    pub has_more: bool,
}

/// Object store collaborator holding the photo objects.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// List photo objects in lexicographic key order.
    async fn list_photos(&self, request: ListRequest) -> Result<PhotoPage, StoreError>;

    /// Produce a time-limited presigned upload URL for the given key.
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> Result<String, StoreError>;
}

// =============================================================================
// Favorite Store
// =============================================================================

/// A per-user, per-photo existence record indicating a "liked" relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteMarker {
    pub user_id: String,
    pub photo_key: String,

    /// Creation timestamp (Unix epoch seconds)
    pub created_at: i64,
}

/// Table store collaborator holding favorite markers.
///
/// Favorite markers may reference photo keys that no longer exist in the
/// object store; callers must tolerate that.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn add(&self, user_id: &str, photo_key: &str) -> Result<(), StoreError>;

    async fn remove(&self, user_id: &str, photo_key: &str) -> Result<(), StoreError>;

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<FavoriteMarker>, StoreError>;

    /// Global favorite counts for the given photo keys.
    ///
    /// Keys with no favorites may be absent from the returned map.
    async fn counts_for_keys(&self, keys: &[String])
        -> Result<HashMap<String, u64>, StoreError>;
}

// =============================================================================
// Tag Store
// =============================================================================

/// A per-photo tag created by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMarker {
    pub photo_key: String,
    pub user_id: String,
    pub tag: String,

    /// Creation timestamp (Unix epoch seconds)
    pub created_at: i64,
}

/// Table store collaborator holding tag markers.
#[async_trait]
pub trait TagStore: Send + Sync {
    async fn add(&self, photo_key: &str, user_id: &str, tag: &str) -> Result<(), StoreError>;

    async fn remove(&self, photo_key: &str, user_id: &str, tag: &str) -> Result<(), StoreError>;

    async fn list_for_photo(&self, photo_key: &str) -> Result<Vec<TagMarker>, StoreError>;
}
