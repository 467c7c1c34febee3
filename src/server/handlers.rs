//! HTTP request handlers.
//!
//! Each handler is a pure mapping: validate required fields (missing → 400
//! with a fixed `{ "error": ... }` body), perform one or two collaborator
//! calls, map collaborator errors to a 500, else return 200 with a JSON
//! body. No retries, no idempotency keys, no transactions across stores.
//!
//! # Endpoints
//!
//! - `GET /photos` - Sampled, paginated photo listing
//! - `GET|POST|DELETE /favorites` - Favorite markers for the caller
//! - `GET|POST|DELETE /tags` - Tag markers for a photo
//! - `POST /upload-url` - Presigned upload URL
//! - `GET /health` - Health check

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::{SamplerError, StoreError};
use crate::sampler::{effective_limit, Cursor, DiscoverySampler, Page, PageParams};
use crate::store::{FavoriteStore, PhotoStore, TagStore};

use super::identity::{Identity, OptionalIdentity};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Assembles photo listing pages
    pub sampler: Arc<DiscoverySampler>,

    /// Object store, used directly for upload-URL generation
    pub photos: Arc<dyn PhotoStore>,

    pub favorites: Arc<dyn FavoriteStore>,

    pub tags: Arc<dyn TagStore>,

    /// Validity window for presigned upload URLs
    pub upload_ttl: Duration,
}

// =============================================================================
// Errors
// =============================================================================

/// JSON error body returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Handler-level errors mapped onto HTTP statuses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed required request field
    Validation(String),

    /// Malformed pagination token
    InvalidCursor,

    /// Identity required but absent
    Unauthorized,

    /// Page assembly failed
    Sampler(SamplerError),

    /// A direct collaborator call failed
    Store(StoreError),
}

impl From<SamplerError> for ApiError {
    fn from(err: SamplerError) -> Self {
        ApiError::Sampler(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::InvalidCursor => (
                StatusCode::BAD_REQUEST,
                "invalid pagination token".to_string(),
            ),
            ApiError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "authentication required".to_string())
            }
            ApiError::Sampler(SamplerError::Signing(err)) => {
                // Key material details stay in the logs.
                error!(error = %err, "URL signing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to sign photo urls".to_string(),
                )
            }
            ApiError::Sampler(SamplerError::Store(err)) | ApiError::Store(err) => {
                // Downstream messages can leak internals; log in full and
                // return a generic message.
                error!(error = %err, "Downstream store call failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage unavailable".to_string(),
                )
            }
        };

        if status.is_client_error() {
            debug!(status = status.as_u16(), "Client error: {}", message);
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Query parameters for the photo listing endpoint.
///
/// `limit` is deserialized as a raw string so a non-numeric value falls back
/// to the default page size instead of failing extraction.
#[derive(Debug, Deserialize)]
pub struct PhotosQueryParams {
    #[serde(default)]
    pub limit: Option<String>,

    /// Base64-encoded continuation cursor from a previous response
    #[serde(default, rename = "nextToken")]
    pub next_token: Option<String>,
}

/// One photo in the listing response.
#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    pub key: String,

    /// Time-limited signed CDN URL
    pub url: String,

    #[serde(rename = "isFavorite")]
    pub is_favorite: bool,

    #[serde(rename = "favoriteCount")]
    pub favorite_count: u64,

    #[serde(rename = "lastModified", skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Pagination metadata for the listing response.
#[derive(Debug, Serialize)]
pub struct PaginationResponse {
    pub limit: u32,

    /// Number of photos in this response
    pub count: usize,

    #[serde(rename = "hasMore")]
    pub has_more: bool,

    #[serde(rename = "nextToken", skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// Response from the photo listing endpoint.
#[derive(Debug, Serialize)]
pub struct PhotosResponse {
    pub photos: Vec<PhotoResponse>,
    pub pagination: PaginationResponse,
}

impl From<Page> for PhotosResponse {
    fn from(page: Page) -> Self {
        let photos: Vec<PhotoResponse> = page
            .photos
            .into_iter()
            .map(|entry| PhotoResponse {
                key: entry.key,
                url: entry.url,
                is_favorite: entry.is_favorite,
                favorite_count: entry.favorite_count,
                last_modified: entry.last_modified,
                size: entry.size,
            })
            .collect();

        let pagination = PaginationResponse {
            limit: page.limit,
            count: photos.len(),
            has_more: page.has_more,
            next_token: page.next_cursor.map(|c| c.encode()),
        };

        Self { photos, pagination }
    }
}

/// Body for favorite add/remove requests.
#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    #[serde(default, rename = "photoKey")]
    pub photo_key: Option<String>,
}

/// One favorite marker in the favorites listing.
#[derive(Debug, Serialize)]
pub struct FavoriteEntry {
    #[serde(rename = "photoKey")]
    pub photo_key: String,

    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

/// Response from the favorites listing endpoint.
#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<FavoriteEntry>,
}

/// Body for tag add/remove requests.
#[derive(Debug, Deserialize)]
pub struct TagRequest {
    #[serde(default, rename = "photoKey")]
    pub photo_key: Option<String>,

    #[serde(default)]
    pub tag: Option<String>,
}

/// Query parameters for the tags listing endpoint.
#[derive(Debug, Deserialize)]
pub struct TagsQueryParams {
    #[serde(default, rename = "photoKey")]
    pub photo_key: Option<String>,
}

/// One tag marker in the tags listing.
#[derive(Debug, Serialize)]
pub struct TagEntry {
    #[serde(rename = "userId")]
    pub user_id: String,

    pub tag: String,

    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

/// Response from the tags listing endpoint.
#[derive(Debug, Serialize)]
pub struct TagsResponse {
    #[serde(rename = "photoKey")]
    pub photo_key: String,

    pub tags: Vec<TagEntry>,
}

/// Body for upload-URL requests.
#[derive(Debug, Deserialize)]
pub struct UploadUrlRequest {
    #[serde(default, rename = "fileName")]
    pub file_name: Option<String>,

    #[serde(default, rename = "contentType")]
    pub content_type: Option<String>,
}

/// Response from the upload-URL endpoint.
#[derive(Debug, Serialize)]
pub struct UploadUrlResponse {
    #[serde(rename = "uploadUrl")]
    pub upload_url: String,

    /// Object key the upload will land at
    pub key: String,

    /// Unix timestamp when the URL expires
    #[serde(rename = "expiresAt")]
    pub expires_at: u64,
}

/// Generic acknowledgement body for mutations.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

// =============================================================================
// Validation Helpers
// =============================================================================

fn require(field: Option<String>, name: &str) -> Result<String, ApiError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ApiError::Validation(format!(
            "missing required field: {}",
            name
        ))),
    }
}

/// Content types accepted by the upload-URL endpoint.
const UPLOAD_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

fn validate_content_type(content_type: &str) -> Result<(), ApiError> {
    if UPLOAD_CONTENT_TYPES.contains(&content_type) {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "unsupported content type: {}",
            content_type
        )))
    }
}

/// Strip path separators and oddities from a client-supplied file name.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle photo listing requests.
///
/// # Endpoint
///
/// `GET /photos?limit=<1..100>&nextToken=<base64>`
///
/// # Query Parameters
///
/// - `limit`: Requested page size (default 25, clamped to 1..100)
/// - `nextToken`: Continuation cursor from a previous response
///
/// Identity is optional; without it every photo reports
/// `isFavorite: false` and `favoriteCount: 0`.
///
/// # Errors
///
/// - `400 Bad Request`: Malformed `nextToken`
/// - `500 Internal Server Error`: Store or signing failure
pub async fn photos_handler(
    State(state): State<AppState>,
    OptionalIdentity(identity): OptionalIdentity,
    Query(query): Query<PhotosQueryParams>,
) -> Result<Json<PhotosResponse>, ApiError> {
    let limit = effective_limit(query.limit.as_deref());

    let cursor = query
        .next_token
        .as_deref()
        .map(Cursor::decode)
        .transpose()
        .map_err(|_| ApiError::InvalidCursor)?;

    let page = state
        .sampler
        .list_page(PageParams {
            limit,
            cursor,
            identity,
        })
        .await?;

    Ok(Json(PhotosResponse::from(page)))
}

/// Handle favorites listing for the calling user.
///
/// # Endpoint
///
/// `GET /favorites` (identity required)
pub async fn list_favorites_handler(
    State(state): State<AppState>,
    Identity(user_id): Identity,
) -> Result<Json<FavoritesResponse>, ApiError> {
    let markers = state.favorites.list_for_user(&user_id).await?;

    let favorites = markers
        .into_iter()
        .map(|m| FavoriteEntry {
            photo_key: m.photo_key,
            created_at: m.created_at,
        })
        .collect();

    Ok(Json(FavoritesResponse { favorites }))
}

/// Handle favorite creation.
///
/// # Endpoint
///
/// `POST /favorites` with body `{ "photoKey": "..." }` (identity required)
pub async fn add_favorite_handler(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(body): Json<FavoriteRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let photo_key = require(body.photo_key, "photoKey")?;
    state.favorites.add(&user_id, &photo_key).await?;
    Ok(Json(StatusResponse::ok()))
}

/// Handle favorite removal.
///
/// # Endpoint
///
/// `DELETE /favorites` with body `{ "photoKey": "..." }` (identity required)
pub async fn remove_favorite_handler(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(body): Json<FavoriteRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let photo_key = require(body.photo_key, "photoKey")?;
    state.favorites.remove(&user_id, &photo_key).await?;
    Ok(Json(StatusResponse::ok()))
}

/// Handle tag listing for a photo.
///
/// # Endpoint
///
/// `GET /tags?photoKey=<key>`
pub async fn list_tags_handler(
    State(state): State<AppState>,
    Query(query): Query<TagsQueryParams>,
) -> Result<Json<TagsResponse>, ApiError> {
    let photo_key = require(query.photo_key, "photoKey")?;
    let markers = state.tags.list_for_photo(&photo_key).await?;

    let tags = markers
        .into_iter()
        .map(|m| TagEntry {
            user_id: m.user_id,
            tag: m.tag,
            created_at: m.created_at,
        })
        .collect();

    Ok(Json(TagsResponse { photo_key, tags }))
}

/// Handle tag creation.
///
/// # Endpoint
///
/// `POST /tags` with body `{ "photoKey": "...", "tag": "..." }`
/// (identity required)
pub async fn add_tag_handler(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(body): Json<TagRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let photo_key = require(body.photo_key, "photoKey")?;
    let tag = require(body.tag, "tag")?;
    state.tags.add(&photo_key, &user_id, &tag).await?;
    Ok(Json(StatusResponse::ok()))
}

/// Handle tag removal.
///
/// # Endpoint
///
/// `DELETE /tags` with body `{ "photoKey": "...", "tag": "..." }`
/// (identity required)
pub async fn remove_tag_handler(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(body): Json<TagRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let photo_key = require(body.photo_key, "photoKey")?;
    let tag = require(body.tag, "tag")?;
    state.tags.remove(&photo_key, &user_id, &tag).await?;
    Ok(Json(StatusResponse::ok()))
}

/// Handle upload-URL generation.
///
/// # Endpoint
///
/// `POST /upload-url` with body `{ "fileName": "...", "contentType": "..." }`
/// (identity required)
///
/// # Errors
///
/// - `400 Bad Request`: Missing field or unsupported content type
/// - `401 Unauthorized`: No identity
/// - `500 Internal Server Error`: Presigning failure
pub async fn upload_url_handler(
    State(state): State<AppState>,
    Identity(user_id): Identity,
    Json(body): Json<UploadUrlRequest>,
) -> Result<Json<UploadUrlResponse>, ApiError> {
    let file_name = require(body.file_name, "fileName")?;
    let content_type = require(body.content_type, "contentType")?;
    validate_content_type(&content_type)?;

    // Uploads land under a per-user prefix with a collision-proof name.
    let key = format!(
        "uploads/{}/{}_{}",
        user_id,
        Uuid::new_v4(),
        sanitize_file_name(&file_name)
    );

    let upload_url = state
        .photos
        .presign_upload(&key, &content_type, state.upload_ttl)
        .await?;

    let expires_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        + state.upload_ttl.as_secs();

    Ok(Json(UploadUrlResponse {
        upload_url,
        key,
        expires_at,
    }))
}

// =============================================================================
// Tests
// =============================================================================
