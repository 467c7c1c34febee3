//! Test utilities for integration tests.
//!
//! This module provides in-memory mock implementations of the storage and
//! signing collaborators, plus helpers for assembling a test router.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::Router;
use http::{header, Method, Request};
use http_body_util::BodyExt;
use tokio::sync::RwLock;

use photostream::error::{SigningError, StoreError};
use photostream::sampler::{DiscoverySampler, SamplerConfig, ShufflePolicy};
use photostream::server::{create_router, AppState, RouterConfig, IDENTITY_HEADER};
use photostream::signing::PhotoUrlSigner;
use photostream::store::{
    FavoriteMarker, FavoriteStore, ListRequest, PhotoObject, PhotoPage, PhotoStore, TagMarker,
    TagStore,
};

// =============================================================================
// Mock Photo Store with Request Tracking
// =============================================================================

/// An in-memory photo store over a sorted key list.
///
/// Listing follows the lexicographic semantics of a real object store:
/// `start_after` is an exclusive lower bound, the continuation token is the
/// last key of the previous page, and `has_more` reflects remaining keys.
/// All listing requests are recorded for assertions on sampling behavior.
pub struct MockPhotoStore {
    keys: Vec<String>,
    requests: Arc<RwLock<Vec<ListRequest>>>,
}

impl MockPhotoStore {
    pub fn new(mut keys: Vec<String>) -> Self {
        keys.sort();
        Self {
            keys,
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn from_keys(keys: &[&str]) -> Self {
        Self::new(keys.iter().map(|k| k.to_string()).collect())
    }

    pub async fn recorded_requests(&self) -> Vec<ListRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl PhotoStore for MockPhotoStore {
    async fn list_photos(&self, request: ListRequest) -> Result<PhotoPage, StoreError> {
        self.requests.write().await.push(request.clone());

        // Both the continuation token and start_after resume strictly after
        // the given key.
        let lower_bound = request.cursor.or(request.start_after);
        let start = match lower_bound {
            Some(bound) => self.keys.iter().position(|k| k > &bound).unwrap_or(self.keys.len()),
            None => 0,
        };

        let limit = request.limit as usize;
        let page: Vec<PhotoObject> = self.keys[start..]
            .iter()
            .take(limit)
            .map(|k| PhotoObject {
                key: k.clone(),
                last_modified: Some(1735689600),
                size: Some(2048),
            })
            .collect();

        let has_more = start + page.len() < self.keys.len();
        let next_cursor = if has_more {
            page.last().map(|p| p.key.clone())
        } else {
            None
        };

        Ok(PhotoPage {
            photos: page,
            next_cursor,
            has_more,
        })
    }

    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> Result<String, StoreError> {
        Ok(format!(
            "https://s3.test/photos/{}?X-Amz-Expires={}&content-type={}",
            key,
            ttl.as_secs(),
            content_type
        ))
    }
}

/// A photo store whose listing always fails.
pub struct FailingPhotoStore;

#[async_trait]
impl PhotoStore for FailingPhotoStore {
    async fn list_photos(&self, _request: ListRequest) -> Result<PhotoPage, StoreError> {
        Err(StoreError::Storage(
            "access denied (service: S3, status: 403)".to_string(),
        ))
    }

    async fn presign_upload(
        &self,
        _key: &str,
        _content_type: &str,
        _ttl: Duration,
    ) -> Result<String, StoreError> {
        Err(StoreError::Storage(
            "access denied (service: S3, status: 403)".to_string(),
        ))
    }
}

// =============================================================================
// Mock Favorite Store
// =============================================================================

/// An in-memory favorite store preserving insertion order per user.
#[derive(Default)]
pub struct MockFavoriteStore {
    markers: RwLock<Vec<FavoriteMarker>>,
}

impl MockFavoriteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed favorites for a user without going through the API.
    pub async fn seed(&self, user_id: &str, photo_keys: &[&str]) {
        let mut markers = self.markers.write().await;
        for (i, key) in photo_keys.iter().enumerate() {
            markers.push(FavoriteMarker {
                user_id: user_id.to_string(),
                photo_key: key.to_string(),
                created_at: 1735689600 + i as i64,
            });
        }
    }
}

#[async_trait]
impl FavoriteStore for MockFavoriteStore {
    async fn add(&self, user_id: &str, photo_key: &str) -> Result<(), StoreError> {
        let mut markers = self.markers.write().await;
        let exists = markers
            .iter()
            .any(|m| m.user_id == user_id && m.photo_key == photo_key);
        if !exists {
            markers.push(FavoriteMarker {
                user_id: user_id.to_string(),
                photo_key: photo_key.to_string(),
                created_at: 1735689600,
            });
        }
        Ok(())
    }

    async fn remove(&self, user_id: &str, photo_key: &str) -> Result<(), StoreError> {
        self.markers
            .write()
            .await
            .retain(|m| !(m.user_id == user_id && m.photo_key == photo_key));
        Ok(())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<FavoriteMarker>, StoreError> {
        Ok(self
            .markers
            .read()
            .await
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn counts_for_keys(
        &self,
        keys: &[String],
    ) -> Result<HashMap<String, u64>, StoreError> {
        let markers = self.markers.read().await;
        let mut counts = HashMap::new();
        for key in keys {
            let count = markers.iter().filter(|m| &m.photo_key == key).count() as u64;
            if count > 0 {
                counts.insert(key.clone(), count);
            }
        }
        Ok(counts)
    }
}

// =============================================================================
// Mock Tag Store
// =============================================================================

/// An in-memory tag store.
#[derive(Default)]
pub struct MockTagStore {
    markers: RwLock<Vec<TagMarker>>,
}

impl MockTagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TagStore for MockTagStore {
    async fn add(&self, photo_key: &str, user_id: &str, tag: &str) -> Result<(), StoreError> {
        let mut markers = self.markers.write().await;
        let exists = markers
            .iter()
            .any(|m| m.photo_key == photo_key && m.user_id == user_id && m.tag == tag);
        if !exists {
            markers.push(TagMarker {
                photo_key: photo_key.to_string(),
                user_id: user_id.to_string(),
                tag: tag.to_string(),
                created_at: 1735689600,
            });
        }
        Ok(())
    }

    async fn remove(&self, photo_key: &str, user_id: &str, tag: &str) -> Result<(), StoreError> {
        self.markers
            .write()
            .await
            .retain(|m| !(m.photo_key == photo_key && m.user_id == user_id && m.tag == tag));
        Ok(())
    }

    async fn list_for_photo(&self, photo_key: &str) -> Result<Vec<TagMarker>, StoreError> {
        Ok(self
            .markers
            .read()
            .await
            .iter()
            .filter(|m| m.photo_key == photo_key)
            .cloned()
            .collect())
    }
}

// =============================================================================
// Mock URL Signer
// =============================================================================

/// A signer producing deterministic fake URLs, with optional failures.
pub struct MockSigner {
    fail_all: bool,
    fail_keys: HashSet<String>,
}

impl MockSigner {
    pub fn new() -> Self {
        Self {
            fail_all: false,
            fail_keys: HashSet::new(),
        }
    }

    /// A signer where every attempt fails, simulating an unreachable
    /// signing key.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            fail_keys: HashSet::new(),
        }
    }

    /// Fail signing for the given keys only.
    pub fn failing_for(keys: &[&str]) -> Self {
        Self {
            fail_all: false,
            fail_keys: keys.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl Default for MockSigner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PhotoUrlSigner for MockSigner {
    async fn signed_url(&self, photo_key: &str) -> Result<String, SigningError> {
        if self.fail_all {
            return Err(SigningError::Configuration(
                "signing key unavailable".to_string(),
            ));
        }
        if self.fail_keys.contains(photo_key) {
            return Err(SigningError::PerItem {
                key: photo_key.to_string(),
                message: "hmac failure".to_string(),
            });
        }
        Ok(format!("https://cdn.test/{}?sig=mock", photo_key))
    }
}

// =============================================================================
// Router Assembly
// =============================================================================

/// A sampler configuration whose first pages are deterministic: always list
/// from the start, preserve listing order, fixed seed.
pub fn deterministic_config() -> SamplerConfig {
    SamplerConfig::default()
        .with_full_scan_probability(1.0)
        .with_shuffle(ShufflePolicy::Preserve)
        .with_seed(7)
}

/// Assemble an [`AppState`] over the given mocks.
pub fn test_state(
    photos: Arc<dyn PhotoStore>,
    favorites: Arc<dyn FavoriteStore>,
    tags: Arc<dyn TagStore>,
    signer: Arc<dyn PhotoUrlSigner>,
    config: SamplerConfig,
) -> AppState {
    let sampler = Arc::new(DiscoverySampler::with_config(
        Arc::clone(&photos),
        Arc::clone(&favorites),
        signer,
        config,
    ));

    AppState {
        sampler,
        photos,
        favorites,
        tags,
        upload_ttl: Duration::from_secs(900),
    }
}

/// Build a router over the given state with tracing disabled.
pub fn test_router(state: AppState) -> Router {
    create_router(state, RouterConfig::new().with_tracing(false))
}

/// Build a router over a key list with all other collaborators defaulted.
pub fn router_for_keys(keys: &[&str], config: SamplerConfig) -> Router {
    let state = test_state(
        Arc::new(MockPhotoStore::from_keys(keys)),
        Arc::new(MockFavoriteStore::new()),
        Arc::new(MockTagStore::new()),
        Arc::new(MockSigner::new()),
        config,
    );
    test_router(state)
}

// =============================================================================
// Request Helpers
// =============================================================================

/// Build a GET request, optionally carrying an identity header.
pub fn get_request(uri: &str, identity: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(user) = identity {
        builder = builder.header(IDENTITY_HEADER, user);
    }
    builder.body(Body::empty()).unwrap()
}

/// Build a JSON request with the given method and body.
pub fn json_request(
    method: Method,
    uri: &str,
    identity: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(user) = identity {
        builder = builder.header(IDENTITY_HEADER, user);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Collect a response body as JSON.
pub async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
