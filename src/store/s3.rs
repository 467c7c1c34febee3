//! S3-backed implementation of [`PhotoStore`].
//!
//! Listing maps directly onto `ListObjectsV2`: an exact resumption uses the
//! store's continuation token, a sampled seek uses `StartAfter`. Upload URLs
//! are presigned `PutObject` requests.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;

use crate::error::StoreError;

use super::{ListRequest, PhotoObject, PhotoPage, PhotoStore};

/// S3-backed implementation of [`PhotoStore`].
#[derive(Clone)]
pub struct S3PhotoStore {
    client: Client,
    bucket: String,
    prefix: Option<String>,
}

impl S3PhotoStore {
    /// Create a new S3PhotoStore for the given bucket.
    ///
    /// # Arguments
    /// * `client` - AWS S3 client to use for requests
    /// * `bucket` - S3 bucket name containing the photos
    /// * `prefix` - Optional key prefix restricting the listing
    pub fn new(client: Client, bucket: String, prefix: Option<String>) -> Self {
        Self {
            client,
            bucket,
            prefix,
        }
    }

    /// Get the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl PhotoStore for S3PhotoStore {
    async fn list_photos(&self, request: ListRequest) -> Result<PhotoPage, StoreError> {
        let mut builder = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .max_keys(request.limit as i32);

        if let Some(ref prefix) = self.prefix {
            builder = builder.prefix(prefix);
        }

        // ListObjectsV2 ignores StartAfter when a continuation token is
        // present, so only one of the two is ever set on a request.
        if let Some(cursor) = request.cursor {
            builder = builder.continuation_token(cursor);
        } else if let Some(start_after) = request.start_after {
            builder = builder.start_after(start_after);
        }

        let result = builder
            .send()
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let photos = result
            .contents()
            .iter()
            .filter_map(|obj| {
                obj.key().map(|key| PhotoObject {
                    key: key.to_string(),
                    last_modified: obj.last_modified().map(|dt| dt.secs()),
                    size: obj.size().and_then(|s| u64::try_from(s).ok()),
                })
            })
            .collect();

        let has_more = result.is_truncated() == Some(true);
        let next_cursor = if has_more {
            result.next_continuation_token().map(|t| t.to_string())
        } else {
            None
        };

        Ok(PhotoPage {
            photos,
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
        let config = PresigningConfig::expires_in(ttl)
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(config)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }
}

/// Create an S3 client with optional custom endpoint and region.
///
/// Use a custom endpoint for S3-compatible services like MinIO:
/// ```ignore
/// let client = create_s3_client(Some("http://localhost:9000"), "us-east-1").await;
/// ```
///
/// For AWS S3, pass `None` to use the default endpoint.
pub async fn create_s3_client(endpoint_url: Option<&str>, region: &str) -> Client {
    let region = aws_config::Region::new(region.to_string());
    let mut config_loader =
        aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);

    if let Some(endpoint) = endpoint_url {
        config_loader = config_loader.endpoint_url(endpoint);
    }

    let sdk_config = config_loader.load().await;

    // For S3-compatible services, we often need to use path-style addressing
    let s3_config = if endpoint_url.is_some() {
        aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build()
    } else {
        aws_sdk_s3::config::Builder::from(&sdk_config).build()
    };

    Client::from_conf(s3_config)
}
