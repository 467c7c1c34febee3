//! Photostream - a sampled photo listing service.
//!
//! This binary starts the HTTP server and configures all components.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use photostream::{
    config::Config,
    create_s3_client,
    sampler::DiscoverySampler,
    server::{create_router, AppState, RouterConfig},
    signing::{CdnUrlSigner, SecretsManagerSource, SigningKeyCache},
    store::{DynamoFavoriteStore, DynamoTagStore, S3PhotoStore},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let sampler_config = match config.sampler_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Configuration:");
    info!("  S3 bucket: {}", config.s3_bucket);
    if let Some(ref prefix) = config.s3_prefix {
        info!("  S3 prefix: {}", prefix);
    }
    if let Some(ref endpoint) = config.s3_endpoint {
        info!("  S3 endpoint: {}", endpoint);
    }
    info!("  Region: {}", config.s3_region);
    info!("  Favorites table: {}", config.favorites_table);
    info!("  Tags table: {}", config.tags_table);
    info!("  CDN base URL: {}", config.cdn_base_url);
    info!("  Signed URL TTL: {}s", config.url_ttl);

    // Create AWS clients
    let s3_client = create_s3_client(config.s3_endpoint.as_deref(), &config.s3_region).await;

    let region = aws_config::Region::new(config.s3_region.clone());
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(region)
        .load()
        .await;
    let dynamo_client = aws_sdk_dynamodb::Client::new(&sdk_config);
    let secrets_client = aws_sdk_secretsmanager::Client::new(&sdk_config);

    // Test S3 connectivity
    info!("Connecting to S3...");
    match test_s3_connection(&s3_client, &config.s3_bucket, config.s3_prefix.as_deref()).await {
        Ok(photo_count) => {
            info!("  Connected successfully");
            info!("  Found {} photo(s) in the first listing page", photo_count);
        }
        Err(e) => {
            error!("  Failed to connect to S3: {}", e);
            error!("  Please check:");
            error!("    - Your AWS credentials are configured correctly");
            error!(
                "    - The bucket '{}' exists and is accessible",
                config.s3_bucket
            );
            error!("    - The S3 endpoint is correct (if using MinIO/custom S3)");
            return ExitCode::FAILURE;
        }
    }

    // Assemble the collaborators
    let photos: Arc<dyn photostream::store::PhotoStore> = Arc::new(S3PhotoStore::new(
        s3_client,
        config.s3_bucket.clone(),
        config.s3_prefix.clone(),
    ));
    let favorites: Arc<dyn photostream::store::FavoriteStore> = Arc::new(
        DynamoFavoriteStore::new(dynamo_client.clone(), config.favorites_table.clone()),
    );
    let tags: Arc<dyn photostream::store::TagStore> = Arc::new(DynamoTagStore::new(
        dynamo_client,
        config.tags_table.clone(),
    ));

    // The signing key is fetched lazily on the first signed URL and cached
    // for the process lifetime.
    let secret_source = Arc::new(SecretsManagerSource::new(
        secrets_client,
        config.signing_secret_id.clone(),
    ));
    let key_cache = Arc::new(SigningKeyCache::new(secret_source));
    let signer: Arc<dyn photostream::signing::PhotoUrlSigner> = Arc::new(CdnUrlSigner::new(
        config.cdn_base_url.clone(),
        Duration::from_secs(config.url_ttl),
        key_cache,
    ));

    let sampler = Arc::new(DiscoverySampler::with_config(
        Arc::clone(&photos),
        Arc::clone(&favorites),
        signer,
        sampler_config,
    ));

    let state = AppState {
        sampler,
        photos,
        favorites,
        tags,
        upload_ttl: Duration::from_secs(config.upload_url_ttl),
    };

    // Build router configuration
    let mut router_config = RouterConfig::new().with_tracing(!config.no_tracing);
    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    let router = create_router(state, router_config);

    // Bind and serve
    let addr = config.bind_address();

    info!("Server listening on: http://{}", addr);
    info!("  Try: curl http://{}/health", addr);
    info!("  Try: curl http://{}/photos?limit=10", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Test S3 connectivity and count photos on the first listing page.
async fn test_s3_connection(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    prefix: Option<&str>,
) -> Result<usize, String> {
    let mut request = client.list_objects_v2().bucket(bucket).max_keys(1000);
    if let Some(prefix) = prefix {
        request = request.prefix(prefix);
    }

    let result = request.send().await.map_err(|e| format!("{}", e))?;

    let count = result
        .contents()
        .iter()
        .filter(|obj| {
            obj.key()
                .map(|k| photostream::sampler::is_image_key(k))
                .unwrap_or(false)
        })
        .count();

    Ok(count)
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "photostream=debug,tower_http=debug"
    } else {
        "photostream=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
