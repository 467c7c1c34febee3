//! Configuration management for the photo service.
//!
//! This module provides a flexible configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `PHOTO_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use photostream::config::Config;
//!
//! // Parse from command line and environment
//! let config = Config::parse();
//!
//! println!("Listening on {}", config.bind_address());
//! println!("S3 bucket: {}", config.s3_bucket);
//! ```
//!
//! # Environment Variables
//!
//! All configuration options can be set via environment variables with the `PHOTO_` prefix:
//!
//! - `PHOTO_HOST` - Server bind address (default: 0.0.0.0)
//! - `PHOTO_PORT` - Server port (default: 3000)
//! - `PHOTO_S3_BUCKET` - S3 bucket name (required)
//! - `PHOTO_S3_PREFIX` - Key prefix restricting the listing
//! - `PHOTO_S3_ENDPOINT` - Custom S3 endpoint for S3-compatible services
//! - `PHOTO_S3_REGION` - AWS region (default: us-east-1)
//! - `PHOTO_FAVORITES_TABLE` - DynamoDB table for favorite markers
//! - `PHOTO_TAGS_TABLE` - DynamoDB table for tag markers
//! - `PHOTO_SIGNING_SECRET_ID` - Secrets Manager id holding the CDN signing key
//! - `PHOTO_CDN_BASE_URL` - Base URL signed photo URLs point at (required)
//! - `PHOTO_URL_TTL` - Signed URL validity in seconds (default: 3600)
//! - `PHOTO_UPLOAD_URL_TTL` - Presigned upload validity in seconds (default: 900)
//! - `PHOTO_FULL_SCAN_PROBABILITY` - Chance a first page lists from the start
//! - `PHOTO_SEEK_STRATEGIES` - Comma-separated `weight:prefix` seek entries
//! - `PHOTO_CORS_ORIGINS` - Allowed CORS origins (comma-separated)

use clap::Parser;

use crate::sampler::{SamplerConfig, SeekPattern, SeekStrategy, DEFAULT_FULL_SCAN_PROBABILITY};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default signed photo URL validity (1 hour).
pub const DEFAULT_URL_TTL_SECONDS: u64 = 3600;

/// Default presigned upload URL validity (15 minutes).
pub const DEFAULT_UPLOAD_URL_TTL_SECONDS: u64 = 900;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Photostream - a sampled photo listing service.
///
/// Serves randomized, paginated listings of photos stored in S3, signing
/// per-photo CDN URLs and annotating each photo with the caller's favorites.
#[derive(Parser, Debug, Clone)]
#[command(name = "photostream")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "PHOTO_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PHOTO_PORT")]
    pub port: u16,

    // =========================================================================
    // S3 Configuration
    // =========================================================================
    /// S3 bucket name containing the photos.
    #[arg(long, env = "PHOTO_S3_BUCKET")]
    pub s3_bucket: String,

    /// Key prefix restricting the listing (e.g. "photos/").
    #[arg(long, env = "PHOTO_S3_PREFIX")]
    pub s3_prefix: Option<String>,

    /// Custom S3 endpoint URL for S3-compatible services (MinIO, etc.).
    ///
    /// If not specified, uses the default AWS S3 endpoint.
    #[arg(long, env = "PHOTO_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region.
    #[arg(long, default_value = DEFAULT_REGION, env = "PHOTO_S3_REGION")]
    pub s3_region: String,

    // =========================================================================
    // DynamoDB Configuration
    // =========================================================================
    /// DynamoDB table holding favorite markers.
    #[arg(long, env = "PHOTO_FAVORITES_TABLE")]
    pub favorites_table: String,

    /// DynamoDB table holding tag markers.
    #[arg(long, env = "PHOTO_TAGS_TABLE")]
    pub tags_table: String,

    // =========================================================================
    // Signing Configuration
    // =========================================================================
    /// Secrets Manager secret id holding the CDN signing key.
    #[arg(long, env = "PHOTO_SIGNING_SECRET_ID")]
    pub signing_secret_id: String,

    /// Base URL that signed photo URLs point at.
    #[arg(long, env = "PHOTO_CDN_BASE_URL")]
    pub cdn_base_url: String,

    /// Signed photo URL validity in seconds.
    #[arg(long, default_value_t = DEFAULT_URL_TTL_SECONDS, env = "PHOTO_URL_TTL")]
    pub url_ttl: u64,

    /// Presigned upload URL validity in seconds.
    #[arg(long, default_value_t = DEFAULT_UPLOAD_URL_TTL_SECONDS, env = "PHOTO_UPLOAD_URL_TTL")]
    pub upload_url_ttl: u64,

    // =========================================================================
    // Sampling Configuration
    // =========================================================================
    /// Probability that a first page lists from the start of the key space
    /// instead of a sampled position.
    #[arg(long, default_value_t = DEFAULT_FULL_SCAN_PROBABILITY, env = "PHOTO_FULL_SCAN_PROBABILITY")]
    pub full_scan_probability: f64,

    /// Seek strategies as comma-separated `weight:prefix` entries,
    /// e.g. "8:year-month,1:events/,1:trips/". The special prefix
    /// "year-month" generates a random `YYYY_Month/` key.
    #[arg(long, env = "PHOTO_SEEK_STRATEGIES", value_delimiter = ',')]
    pub seek_strategies: Option<Vec<String>>,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated). The first entry is the
    /// fallback echoed to callers not on the list.
    #[arg(long, env = "PHOTO_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.s3_bucket.is_empty() {
            return Err(
                "S3 bucket name is required. Set --s3-bucket or PHOTO_S3_BUCKET".to_string(),
            );
        }

        if self.favorites_table.is_empty() {
            return Err(
                "Favorites table is required. Set --favorites-table or PHOTO_FAVORITES_TABLE"
                    .to_string(),
            );
        }

        if self.tags_table.is_empty() {
            return Err("Tags table is required. Set --tags-table or PHOTO_TAGS_TABLE".to_string());
        }

        if self.signing_secret_id.is_empty() {
            return Err(
                "Signing secret id is required. Set --signing-secret-id or PHOTO_SIGNING_SECRET_ID"
                    .to_string(),
            );
        }

        if self.cdn_base_url.is_empty() {
            return Err(
                "CDN base URL is required. Set --cdn-base-url or PHOTO_CDN_BASE_URL".to_string(),
            );
        }
        if !self.cdn_base_url.starts_with("http://") && !self.cdn_base_url.starts_with("https://")
        {
            return Err("CDN base URL must start with http:// or https://".to_string());
        }

        if self.url_ttl == 0 {
            return Err("url_ttl must be greater than 0".to_string());
        }
        if self.upload_url_ttl == 0 {
            return Err("upload_url_ttl must be greater than 0".to_string());
        }

        if !(0.0..=1.0).contains(&self.full_scan_probability) {
            return Err("full_scan_probability must be between 0.0 and 1.0".to_string());
        }

        if let Some(specs) = &self.seek_strategies {
            parse_seek_strategies(specs)?;
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Build the sampler configuration from the parsed settings.
    pub fn sampler_config(&self) -> Result<SamplerConfig, String> {
        let mut config =
            SamplerConfig::default().with_full_scan_probability(self.full_scan_probability);

        if let Some(specs) = &self.seek_strategies {
            config = config.with_strategies(parse_seek_strategies(specs)?);
        }

        Ok(config)
    }
}

/// Parse `weight:prefix` seek strategy entries.
///
/// The prefix "year-month" maps to the random year/month pattern; anything
/// else is a literal key prefix.
pub fn parse_seek_strategies(specs: &[String]) -> Result<Vec<SeekStrategy>, String> {
    let mut strategies = Vec::with_capacity(specs.len());

    for spec in specs {
        let spec = spec.trim();
        if spec.is_empty() {
            continue;
        }

        let (weight, prefix) = spec
            .split_once(':')
            .ok_or_else(|| format!("invalid seek strategy '{}': expected weight:prefix", spec))?;

        let weight: u32 = weight
            .trim()
            .parse()
            .map_err(|_| format!("invalid seek strategy weight in '{}'", spec))?;
        if weight == 0 {
            return Err(format!("seek strategy weight must be positive in '{}'", spec));
        }

        let pattern = match prefix.trim() {
            "year-month" => SeekPattern::YearMonth {
                start_year: 2018,
                end_year: 2024,
            },
            literal if !literal.is_empty() => SeekPattern::Prefix(literal.to_string()),
            _ => return Err(format!("empty seek strategy prefix in '{}'", spec)),
        };

        strategies.push(SeekStrategy { weight, pattern });
    }

    if strategies.is_empty() {
        return Err("seek strategies must contain at least one entry".to_string());
    }

    Ok(strategies)
}

// =============================================================================
// Tests
// =============================================================================
