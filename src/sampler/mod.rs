//! The discovery sampler.
//!
//! Decides where in the lexicographically ordered key space an
//! unauthenticated first-page listing starts, so repeated calls surface
//! different photos instead of always the first keys. Subsequent pages
//! resume deterministically from an opaque cursor.
//!
//! # Pipeline
//!
//! ```text
//! ┌───────────────┐   ┌──────────────┐   ┌───────────────┐   ┌──────────┐
//! │ seek strategy │ → │ store listing│ → │ filter + sign │ → │  order   │
//! │ (randomized)  │   │ (+ fallback) │   │ (per-item)    │   │ (shuffle)│
//! └───────────────┘   └──────────────┘   └───────────────┘   └──────────┘
//! ```

mod cursor;
mod strategy;

#[allow(clippy::module_inception)]
mod sampler;

pub use cursor::Cursor;
pub use sampler::{is_image_key, is_variant_key, DiscoverySampler, Page, PageParams, PhotoEntry};
pub use strategy::{
    SamplerConfig, SeekPattern, SeekStrategy, ShufflePolicy, DEFAULT_FULL_SCAN_PROBABILITY,
};

/// Default page size when the client does not supply a limit.
pub const DEFAULT_PAGE_LIMIT: u32 = 25;

/// Smallest accepted page size.
pub const MIN_PAGE_LIMIT: u32 = 1;

/// Largest accepted page size.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Compute the effective page size from the raw query value.
///
/// Absent or non-numeric values fall back to the default; numeric values are
/// clamped to `[MIN_PAGE_LIMIT, MAX_PAGE_LIMIT]`.
pub fn effective_limit(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .map(|n| n.clamp(MIN_PAGE_LIMIT, MAX_PAGE_LIMIT))
        .unwrap_or(DEFAULT_PAGE_LIMIT)
}
