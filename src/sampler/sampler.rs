//! Page assembly: seek, list, filter, annotate, sign, order.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::error::{SamplerError, SigningError, StoreError};
use crate::signing::PhotoUrlSigner;
use crate::store::{FavoriteStore, ListRequest, PhotoObject, PhotoPage, PhotoStore};

use super::strategy::{pick_strategy, SamplerConfig, ShufflePolicy};
use super::{Cursor, MAX_PAGE_LIMIT, MIN_PAGE_LIMIT};

/// Key suffixes eligible for listing.
const IMAGE_SUFFIXES: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Stem markers denoting an alternate rendition of an already-included photo.
const VARIANT_MARKERS: &[&str] = &["_a", "_b"];

/// Whether a key has a recognized image suffix.
pub fn is_image_key(key: &str) -> bool {
    let key_lower = key.to_lowercase();
    IMAGE_SUFFIXES.iter().any(|ext| key_lower.ends_with(ext))
}

/// Whether a key matches the duplicate-variant naming convention
/// (`photo_a.jpg` is an alternate rendition of `photo.jpg`).
pub fn is_variant_key(key: &str) -> bool {
    let key_lower = key.to_lowercase();
    let Some(dot) = key_lower.rfind('.') else {
        return false;
    };
    let stem = &key_lower[..dot];
    VARIANT_MARKERS.iter().any(|marker| stem.ends_with(marker))
}

fn is_eligible(key: &str) -> bool {
    is_image_key(key) && !is_variant_key(key)
}

// =============================================================================
// Input / Output Types
// =============================================================================

/// Parameters for one page request.
#[derive(Debug, Clone)]
pub struct PageParams {
    /// Requested page size (clamped to the accepted range)
    pub limit: u32,

    /// Decoded continuation cursor; None means first page
    pub cursor: Option<Cursor>,

    /// Authenticated user identifier, used only for favorite lookups
    pub identity: Option<String>,
}

/// One photo in an assembled page.
#[derive(Debug, Clone)]
pub struct PhotoEntry {
    pub key: String,

    /// Time-limited signed CDN URL
    pub url: String,

    pub is_favorite: bool,
    pub favorite_count: u64,
    pub last_modified: Option<i64>,
    pub size: Option<u64>,
}

/// An assembled page of photos plus pagination metadata.
#[derive(Debug, Clone)]
pub struct Page {
    pub photos: Vec<PhotoEntry>,

    /// Effective page size used for the listing
    pub limit: u32,

    pub has_more: bool,

    /// Cursor for the next page, derived from the store's metadata
    pub next_cursor: Option<Cursor>,
}

// =============================================================================
// Discovery Sampler
// =============================================================================

/// Assembles photo listing pages.
///
/// First pages (no cursor) start at a pseudo-random position in the key
/// space; cursored pages resume deterministically. Each invocation is
/// stateless: sampled results are never cached across calls.
pub struct DiscoverySampler {
    store: Arc<dyn PhotoStore>,
    favorites: Arc<dyn FavoriteStore>,
    signer: Arc<dyn PhotoUrlSigner>,
    config: SamplerConfig,
}

impl DiscoverySampler {
    /// Create a sampler with the default configuration.
    pub fn new(
        store: Arc<dyn PhotoStore>,
        favorites: Arc<dyn FavoriteStore>,
        signer: Arc<dyn PhotoUrlSigner>,
    ) -> Self {
        Self::with_config(store, favorites, signer, SamplerConfig::default())
    }

    /// Create a sampler with an explicit configuration.
    pub fn with_config(
        store: Arc<dyn PhotoStore>,
        favorites: Arc<dyn FavoriteStore>,
        signer: Arc<dyn PhotoUrlSigner>,
        config: SamplerConfig,
    ) -> Self {
        Self {
            store,
            favorites,
            signer,
            config,
        }
    }

    /// Assemble one page of photos.
    pub async fn list_page(&self, params: PageParams) -> Result<Page, SamplerError> {
        let limit = params.limit.clamp(MIN_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let mut rng = self.make_rng();
        let first_page = params.cursor.is_none();

        let page = match params.cursor {
            // Exact resumption: deterministic, no randomization.
            Some(cursor) => {
                self.store
                    .list_photos(ListRequest::resume(limit, cursor.into_token()))
                    .await?
            }
            None => self.sample_first_page(limit, &mut rng).await?,
        };

        let PhotoPage {
            photos,
            next_cursor,
            has_more,
        } = page;

        let candidates: Vec<PhotoObject> = photos
            .into_iter()
            .filter(|p| is_eligible(&p.key))
            .collect();

        // Favorite markers for the caller, plus up to max_favorite_backfill
        // favorites the random sample missed (first page only).
        let (favorite_keys, backfill) = match params.identity.as_deref() {
            Some(user) => {
                let markers = self.favorites.list_for_user(user).await?;

                let backfill: Vec<PhotoObject> = if first_page {
                    let present: HashSet<&str> =
                        candidates.iter().map(|p| p.key.as_str()).collect();
                    markers
                        .iter()
                        .filter(|m| is_eligible(&m.photo_key))
                        .filter(|m| !present.contains(m.photo_key.as_str()))
                        .take(self.config.max_favorite_backfill)
                        .map(|m| PhotoObject::from_key(m.photo_key.clone()))
                        .collect()
                } else {
                    Vec::new()
                };

                let keys: HashSet<String> =
                    markers.into_iter().map(|m| m.photo_key).collect();
                (keys, backfill)
            }
            None => (HashSet::new(), Vec::new()),
        };

        let signed = self.sign_all(candidates, backfill).await?;

        // Global favorite counts for the keys that survived signing.
        let counts = if params.identity.is_some() && !signed.is_empty() {
            let keys: Vec<String> = signed.iter().map(|(p, _)| p.key.clone()).collect();
            self.favorites.counts_for_keys(&keys).await?
        } else {
            HashMap::new()
        };

        let mut entries: Vec<PhotoEntry> = signed
            .into_iter()
            .map(|(photo, url)| PhotoEntry {
                is_favorite: favorite_keys.contains(&photo.key),
                favorite_count: counts.get(&photo.key).copied().unwrap_or(0),
                key: photo.key,
                url,
                last_modified: photo.last_modified,
                size: photo.size,
            })
            .collect();

        self.order(&mut entries, &mut rng);

        Ok(Page {
            photos: entries,
            limit,
            has_more,
            next_cursor: next_cursor.map(Cursor::new),
        })
    }

    /// Choose a starting point for a first page and list from it.
    async fn sample_first_page(
        &self,
        limit: u32,
        rng: &mut StdRng,
    ) -> Result<PhotoPage, StoreError> {
        let full_scan = rng.gen_bool(self.config.full_scan_probability.clamp(0.0, 1.0));
        if full_scan {
            return self.store.list_photos(ListRequest::from_start(limit)).await;
        }

        let Some(strategy) = pick_strategy(&self.config.strategies, rng) else {
            return self.store.list_photos(ListRequest::from_start(limit)).await;
        };

        let seek = strategy.pattern.generate(rng);
        debug!(seek = %seek, limit, "Sampling listing start point");

        let sampled = self
            .store
            .list_photos(ListRequest::seek(limit, seek))
            .await?;

        // Too close to the end of the key space: guarantee a minimum fill
        // rate by reissuing from the true beginning.
        if (sampled.photos.len() as u32) * 2 < limit {
            debug!(
                returned = sampled.photos.len(),
                limit, "Sampled page underfilled, retrying from start"
            );
            return self.store.list_photos(ListRequest::from_start(limit)).await;
        }

        Ok(sampled)
    }

    /// Sign all URLs concurrently.
    ///
    /// Per-item failures are logged and the item omitted. If every signing
    /// attempt fails for a non-empty batch the first error propagates, which
    /// covers signing-key configuration failures.
    async fn sign_all(
        &self,
        candidates: Vec<PhotoObject>,
        backfill: Vec<PhotoObject>,
    ) -> Result<Vec<(PhotoObject, String)>, SamplerError> {
        let targets: Vec<PhotoObject> = candidates.into_iter().chain(backfill).collect();
        if targets.is_empty() {
            return Ok(Vec::new());
        }

        let results = join_all(targets.iter().map(|p| self.signer.signed_url(&p.key))).await;

        let mut signed = Vec::with_capacity(targets.len());
        let mut first_error: Option<SigningError> = None;

        for (photo, result) in targets.into_iter().zip(results) {
            match result {
                Ok(url) => signed.push((photo, url)),
                Err(e) => {
                    warn!(key = %photo.key, error = %e, "Dropping photo that failed to sign");
                    first_error.get_or_insert(e);
                }
            }
        }

        if signed.is_empty() {
            if let Some(e) = first_error {
                return Err(e.into());
            }
        }

        Ok(signed)
    }

    /// Final ordering: favorites before non-favorites, groups shuffled per
    /// response under the randomized policy.
    fn order(&self, entries: &mut [PhotoEntry], rng: &mut StdRng) {
        if self.config.shuffle == ShufflePolicy::Randomized {
            entries.shuffle(rng);
        }
        // Stable sort keeps the (possibly shuffled) order within each group.
        entries.sort_by_key(|e| !e.is_favorite);
    }

    fn make_rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
