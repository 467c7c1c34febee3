//! Integration tests for the favorites endpoints.
//!
//! Tests verify:
//! - Add, list, remove flows
//! - Identity requirements (401 without a user header)
//! - Validation of the request body (400 on missing photoKey)
//! - Idempotent adds

use http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use photostream::sampler::SamplerConfig;

use super::test_utils::{get_request, json_request, response_json, router_for_keys};

// =============================================================================
// Flow
// =============================================================================

#[tokio::test]
async fn test_favorite_add_list_remove_flow() {
    let router = router_for_keys(&["2020_June/x.jpg"], SamplerConfig::default());

    // Add
    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/favorites",
            Some("user-1"),
            json!({"photoKey": "2020_June/x.jpg"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // List
    let response = router
        .clone()
        .oneshot(get_request("/favorites", Some("user-1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let favorites = body["favorites"].as_array().unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0]["photoKey"], "2020_June/x.jpg");
    assert!(favorites[0]["createdAt"].is_i64());

    // Remove
    let response = router
        .clone()
        .oneshot(json_request(
            Method::DELETE,
            "/favorites",
            Some("user-1"),
            json!({"photoKey": "2020_June/x.jpg"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // List is empty again
    let response = router
        .oneshot(get_request("/favorites", Some("user-1")))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert!(body["favorites"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_favorite_add_is_idempotent() {
    let router = router_for_keys(&[], SamplerConfig::default());

    for _ in 0..2 {
        let response = router
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/favorites",
                Some("user-1"),
                json!({"photoKey": "2020_June/x.jpg"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = router
        .oneshot(get_request("/favorites", Some("user-1")))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert_eq!(body["favorites"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_favorites_are_scoped_per_user() {
    let router = router_for_keys(&[], SamplerConfig::default());

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/favorites",
            Some("user-1"),
            json!({"photoKey": "2020_June/x.jpg"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(get_request("/favorites", Some("user-2")))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert!(body["favorites"].as_array().unwrap().is_empty());
}

// =============================================================================
// Identity and Validation
// =============================================================================

#[tokio::test]
async fn test_favorite_add_requires_identity() {
    let router = router_for_keys(&[], SamplerConfig::default());

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/favorites",
            None,
            json!({"photoKey": "2020_June/x.jpg"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response_json(response).await;
    assert_eq!(body["error"], "authentication required");
}

#[tokio::test]
async fn test_favorite_list_requires_identity() {
    let router = router_for_keys(&[], SamplerConfig::default());

    let response = router
        .oneshot(get_request("/favorites", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_favorite_add_missing_photo_key() {
    let router = router_for_keys(&[], SamplerConfig::default());

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/favorites",
            Some("user-1"),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error"], "missing required field: photoKey");
}

#[tokio::test]
async fn test_favorite_remove_missing_photo_key() {
    let router = router_for_keys(&[], SamplerConfig::default());

    let response = router
        .oneshot(json_request(
            Method::DELETE,
            "/favorites",
            Some("user-1"),
            json!({"photoKey": "   "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
