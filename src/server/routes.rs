//! Router configuration for the photo service.
//!
//! This module defines the HTTP routes and applies the CORS and tracing
//! middleware.
//!
//! # Route Structure
//!
//! ```text
//! /health         - Health check
//! /photos         - Sampled photo listing (GET)
//! /favorites      - Favorite markers (GET, POST, DELETE)
//! /tags           - Tag markers (GET, POST, DELETE)
//! /upload-url     - Presigned upload URL (POST)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use photostream::server::routes::{create_router, RouterConfig};
//!
//! let config = RouterConfig::new()
//!     .with_cors_origins(vec!["https://photos.example.com".to_string()]);
//!
//! let router = create_router(app_state, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use super::cors::{cors_middleware, CorsPolicy};
use super::handlers::{
    add_favorite_handler, add_tag_handler, health_handler, list_favorites_handler,
    list_tags_handler, photos_handler, remove_favorite_handler, remove_tag_handler,
    upload_url_handler, AppState,
};

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins; the first entry is the fallback echoed to
    /// callers not on the list
    pub cors_origins: Vec<String>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a router configuration with defaults: no explicit origins
    /// (the CORS policy supplies its own default) and tracing enabled.
    pub fn new() -> Self {
        Self {
            cors_origins: Vec::new(),
            enable_tracing: true,
        }
    }

    /// Set the allowed CORS origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// Builds the complete Axum router with all routes, the CORS middleware
/// (applied to every response, errors included) and optional request
/// tracing.
pub fn create_router(state: AppState, config: RouterConfig) -> Router {
    let policy = CorsPolicy::new(&config.cors_origins);

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/photos", get(photos_handler))
        .route(
            "/favorites",
            get(list_favorites_handler)
                .post(add_favorite_handler)
                .delete(remove_favorite_handler),
        )
        .route(
            "/tags",
            get(list_tags_handler)
                .post(add_tag_handler)
                .delete(remove_tag_handler),
        )
        .route("/upload-url", post(upload_url_handler))
        .with_state(state)
        .layer(middleware::from_fn_with_state(policy, cors_middleware));

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

// =============================================================================
// Tests
// =============================================================================
