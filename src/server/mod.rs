//! HTTP server layer.
//!
//! Thin request handlers over the storage collaborators and the discovery
//! sampler, plus the CORS policy and identity extraction.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                          HTTP Layer                            │
//! │   GET /photos    POST /favorites    POST /tags    /upload-url  │
//! │                                                                │
//! │  ┌────────────┐  ┌────────────┐  ┌──────────┐  ┌────────────┐  │
//! │  │  handlers  │  │  identity  │  │   cors   │  │   routes   │  │
//! │  │ (requests) │  │ (extractor)│  │ (policy) │  │  (router)  │  │
//! │  └────────────┘  └────────────┘  └──────────┘  └────────────┘  │
//! └────────────────────────────────────────────────────────────────┘
//! ```

pub mod cors;
pub mod handlers;
pub mod identity;
pub mod routes;

pub use cors::{cors_middleware, CorsPolicy};
pub use handlers::{
    add_favorite_handler, add_tag_handler, health_handler, list_favorites_handler,
    list_tags_handler, photos_handler, remove_favorite_handler, remove_tag_handler,
    upload_url_handler, ApiError, AppState, ErrorBody, FavoriteEntry, FavoriteRequest,
    FavoritesResponse, HealthResponse, PaginationResponse, PhotoResponse, PhotosQueryParams,
    PhotosResponse, TagEntry, TagRequest, TagsQueryParams, TagsResponse, UploadUrlRequest,
    UploadUrlResponse,
};
pub use identity::{Identity, OptionalIdentity, IDENTITY_HEADER};
pub use routes::{create_router, RouterConfig};
