//! Integration tests for the discovery sampler.
//!
//! Tests drive the sampler directly against the mock stores and verify:
//! - Seek-based first pages start midway through the key space
//! - Underfilled seeks fall back to a full-range listing
//! - Favorite backfill on first pages only, capped at three
//! - Ordering policies (favorites first, preserve vs. shuffle)

use std::sync::Arc;

use photostream::sampler::{
    Cursor, DiscoverySampler, PageParams, SamplerConfig, SeekPattern, SeekStrategy, ShufflePolicy,
};

use super::test_utils::{MockFavoriteStore, MockPhotoStore, MockSigner};

fn sampler_with(
    store: Arc<MockPhotoStore>,
    favorites: Arc<MockFavoriteStore>,
    config: SamplerConfig,
) -> DiscoverySampler {
    DiscoverySampler::with_config(store, favorites, Arc::new(MockSigner::new()), config)
}

/// A config that always seeks to the given literal prefix.
fn seek_config(prefix: &str) -> SamplerConfig {
    SamplerConfig::default()
        .with_full_scan_probability(0.0)
        .with_shuffle(ShufflePolicy::Preserve)
        .with_seed(7)
        .with_strategies(vec![SeekStrategy::new(
            1,
            SeekPattern::Prefix(prefix.to_string()),
        )])
}

fn params(limit: u32, identity: Option<&str>) -> PageParams {
    PageParams {
        limit,
        cursor: None,
        identity: identity.map(|s| s.to_string()),
    }
}

// =============================================================================
// Seek and Fallback
// =============================================================================

#[tokio::test]
async fn test_seek_starts_midway_through_key_space() {
    let store = Arc::new(MockPhotoStore::from_keys(&[
        "2019_April/a.jpg",
        "2019_April/b.jpg",
        "2021_May/c.jpg",
        "2021_May/d.jpg",
    ]));
    let sampler = sampler_with(
        Arc::clone(&store),
        Arc::new(MockFavoriteStore::new()),
        seek_config("2021_"),
    );

    let page = sampler.list_page(params(2, None)).await.unwrap();

    let keys: Vec<&str> = page.photos.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["2021_May/c.jpg", "2021_May/d.jpg"]);

    let requests = store.recorded_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].start_after.as_deref(), Some("2021_"));
}

#[tokio::test]
async fn test_underfilled_seek_falls_back_to_full_listing() {
    let store = Arc::new(MockPhotoStore::from_keys(&[
        "2019_April/a.jpg",
        "2019_April/b.jpg",
        "2019_April/c.jpg",
        "2019_April/d.jpg",
    ]));
    // Seeking past the end of the key space returns nothing
    let sampler = sampler_with(
        Arc::clone(&store),
        Arc::new(MockFavoriteStore::new()),
        seek_config("zzz/"),
    );

    let page = sampler.list_page(params(4, None)).await.unwrap();
    assert_eq!(page.photos.len(), 4);

    let requests = store.recorded_requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].start_after.as_deref(), Some("zzz/"));
    assert!(requests[1].start_after.is_none());
    assert!(requests[1].cursor.is_none());
}

#[tokio::test]
async fn test_half_filled_seek_is_kept() {
    let store = Arc::new(MockPhotoStore::from_keys(&[
        "2019_April/a.jpg",
        "2019_April/b.jpg",
        "2021_May/c.jpg",
        "2021_May/d.jpg",
    ]));
    // Seek returns 2 of the requested 4: exactly half, no fallback
    let sampler = sampler_with(
        Arc::clone(&store),
        Arc::new(MockFavoriteStore::new()),
        seek_config("2021_"),
    );

    let page = sampler.list_page(params(4, None)).await.unwrap();
    assert_eq!(page.photos.len(), 2);
    assert_eq!(store.recorded_requests().await.len(), 1);
}

#[tokio::test]
async fn test_cursored_page_skips_sampling() {
    let store = Arc::new(MockPhotoStore::from_keys(&[
        "2019_April/a.jpg",
        "2019_April/b.jpg",
        "2019_April/c.jpg",
    ]));
    let sampler = sampler_with(
        Arc::clone(&store),
        Arc::new(MockFavoriteStore::new()),
        seek_config("2021_"),
    );

    let page = sampler
        .list_page(PageParams {
            limit: 2,
            cursor: Some(Cursor::new("2019_April/a.jpg".to_string())),
            identity: None,
        })
        .await
        .unwrap();

    let keys: Vec<&str> = page.photos.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["2019_April/b.jpg", "2019_April/c.jpg"]);

    // Resumption goes straight to the store with the token
    let requests = store.recorded_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].cursor.as_deref(), Some("2019_April/a.jpg"));
    assert!(requests[0].start_after.is_none());
}

// =============================================================================
// Favorite Backfill
// =============================================================================

#[tokio::test]
async fn test_missed_favorites_backfilled_into_first_page() {
    let store = Arc::new(MockPhotoStore::from_keys(&[
        "2021_May/c.jpg",
        "2021_May/d.jpg",
    ]));
    let favorites = Arc::new(MockFavoriteStore::new());
    favorites.seed("user-1", &["2019_April/fav.jpg"]).await;

    let sampler = sampler_with(store, favorites, seek_config("2021_"));

    let page = sampler.list_page(params(2, Some("user-1"))).await.unwrap();

    let keys: Vec<&str> = page.photos.iter().map(|p| p.key.as_str()).collect();
    // Favorite spliced in and ordered first
    assert_eq!(
        keys,
        vec!["2019_April/fav.jpg", "2021_May/c.jpg", "2021_May/d.jpg"]
    );
    assert!(page.photos[0].is_favorite);
    assert_eq!(page.photos[0].favorite_count, 1);
}

#[tokio::test]
async fn test_backfill_capped_at_three() {
    let store = Arc::new(MockPhotoStore::from_keys(&["2021_May/c.jpg"]));
    let favorites = Arc::new(MockFavoriteStore::new());
    favorites
        .seed(
            "user-1",
            &[
                "2019_April/f1.jpg",
                "2019_April/f2.jpg",
                "2019_April/f3.jpg",
                "2019_April/f4.jpg",
                "2019_April/f5.jpg",
            ],
        )
        .await;

    let sampler = sampler_with(store, favorites, seek_config("2021_"));

    let page = sampler.list_page(params(2, Some("user-1"))).await.unwrap();

    let backfilled = page.photos.iter().filter(|p| p.is_favorite).count();
    assert_eq!(backfilled, 3);
    assert_eq!(page.photos.len(), 4);
}

#[tokio::test]
async fn test_no_backfill_on_cursored_pages() {
    let store = Arc::new(MockPhotoStore::from_keys(&[
        "2021_May/c.jpg",
        "2021_May/d.jpg",
    ]));
    let favorites = Arc::new(MockFavoriteStore::new());
    favorites.seed("user-1", &["2019_April/fav.jpg"]).await;

    let sampler = sampler_with(store, favorites, seek_config("2021_"));

    let page = sampler
        .list_page(PageParams {
            limit: 2,
            cursor: Some(Cursor::new("2021_May/c.jpg".to_string())),
            identity: Some("user-1".to_string()),
        })
        .await
        .unwrap();

    let keys: Vec<&str> = page.photos.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["2021_May/d.jpg"]);
}

#[tokio::test]
async fn test_backfill_skips_favorites_already_sampled() {
    let store = Arc::new(MockPhotoStore::from_keys(&[
        "2021_May/c.jpg",
        "2021_May/d.jpg",
    ]));
    let favorites = Arc::new(MockFavoriteStore::new());
    favorites.seed("user-1", &["2021_May/c.jpg"]).await;

    let sampler = sampler_with(store, favorites, seek_config("2021_"));

    let page = sampler.list_page(params(2, Some("user-1"))).await.unwrap();

    // No duplicate entry for the already-sampled favorite
    assert_eq!(page.photos.len(), 2);
    assert_eq!(page.photos[0].key, "2021_May/c.jpg");
    assert!(page.photos[0].is_favorite);
}

#[tokio::test]
async fn test_backfill_skips_variant_and_non_image_favorites() {
    let store = Arc::new(MockPhotoStore::from_keys(&["2021_May/c.jpg"]));
    let favorites = Arc::new(MockFavoriteStore::new());
    favorites
        .seed(
            "user-1",
            &["2019_April/f_a.jpg", "2019_April/notes.txt", "2019_April/ok.jpg"],
        )
        .await;

    let sampler = sampler_with(store, favorites, seek_config("2021_"));

    let page = sampler.list_page(params(2, Some("user-1"))).await.unwrap();

    let keys: Vec<&str> = page.photos.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["2019_April/ok.jpg", "2021_May/c.jpg"]);
}

// =============================================================================
// Ordering
// =============================================================================

#[tokio::test]
async fn test_shuffled_page_still_orders_favorites_first() {
    let keys: Vec<String> = (0..20).map(|i| format!("2020_June/p{:02}.jpg", i)).collect();
    let key_refs: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
    let store = Arc::new(MockPhotoStore::from_keys(&key_refs));

    let favorites = Arc::new(MockFavoriteStore::new());
    favorites
        .seed("user-1", &["2020_June/p07.jpg", "2020_June/p13.jpg"])
        .await;

    let config = SamplerConfig::default()
        .with_full_scan_probability(1.0)
        .with_shuffle(ShufflePolicy::Randomized)
        .with_seed(42);
    let sampler = sampler_with(store, favorites, config);

    let page = sampler.list_page(params(20, Some("user-1"))).await.unwrap();

    assert_eq!(page.photos.len(), 20);
    assert!(page.photos[0].is_favorite);
    assert!(page.photos[1].is_favorite);
    assert!(page.photos[2..].iter().all(|p| !p.is_favorite));
}

#[tokio::test]
async fn test_preserve_policy_keeps_listing_order_within_groups() {
    let store = Arc::new(MockPhotoStore::from_keys(&[
        "2020_June/a.jpg",
        "2020_June/b.jpg",
        "2020_June/c.jpg",
    ]));
    let config = SamplerConfig::default()
        .with_full_scan_probability(1.0)
        .with_shuffle(ShufflePolicy::Preserve)
        .with_seed(7);
    let sampler = sampler_with(store, Arc::new(MockFavoriteStore::new()), config);

    let page = sampler.list_page(params(3, None)).await.unwrap();

    let keys: Vec<&str> = page.photos.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["2020_June/a.jpg", "2020_June/b.jpg", "2020_June/c.jpg"]
    );
}

// =============================================================================
// Empty Results
// =============================================================================

#[tokio::test]
async fn test_empty_store_yields_empty_page() {
    let store = Arc::new(MockPhotoStore::from_keys(&[]));
    let sampler = sampler_with(
        store,
        Arc::new(MockFavoriteStore::new()),
        SamplerConfig::default()
            .with_full_scan_probability(1.0)
            .with_seed(7),
    );

    let page = sampler.list_page(params(25, None)).await.unwrap();
    assert!(page.photos.is_empty());
    assert!(!page.has_more);
    assert!(page.next_cursor.is_none());
}
