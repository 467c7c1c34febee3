//! DynamoDB-backed implementations of [`FavoriteStore`] and [`TagStore`].
//!
//! Favorites live in a table keyed `(userId, photoKey)`; global per-photo
//! counts come from a `photoKey-index` GSI queried with `Select::Count`.
//! Tags live in a table keyed `(photoKey, entry)` where `entry` is
//! `"{userId}#{tag}"` so a user cannot duplicate a tag on the same photo.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, Select};
use aws_sdk_dynamodb::Client;

use crate::error::StoreError;

use super::{FavoriteMarker, FavoriteStore, TagMarker, TagStore};

/// GSI on the favorites table keyed by photo key, used for global counts.
const FAVORITES_PHOTO_INDEX: &str = "photoKey-index";

fn epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn string_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).cloned()
}

fn number_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Option<i64> {
    item.get(name)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse().ok())
}

// =============================================================================
// Favorites
// =============================================================================

/// DynamoDB-backed implementation of [`FavoriteStore`].
#[derive(Clone)]
pub struct DynamoFavoriteStore {
    client: Client,
    table: String,
}

impl DynamoFavoriteStore {
    pub fn new(client: Client, table: String) -> Self {
        Self { client, table }
    }

    /// Get the table name.
    pub fn table(&self) -> &str {
        &self.table
    }
}

#[async_trait]
impl FavoriteStore for DynamoFavoriteStore {
    async fn add(&self, user_id: &str, photo_key: &str) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .item("userId", AttributeValue::S(user_id.to_string()))
            .item("photoKey", AttributeValue::S(photo_key.to_string()))
            .item("createdAt", AttributeValue::N(epoch_secs().to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn remove(&self, user_id: &str, photo_key: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .key("userId", AttributeValue::S(user_id.to_string()))
            .key("photoKey", AttributeValue::S(photo_key.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<FavoriteMarker>, StoreError> {
        let mut markers = Vec::new();
        let mut last_evaluated_key = None;

        // Favorite sets are small; page through the partition in full.
        loop {
            let mut builder = self
                .client
                .query()
                .table_name(&self.table)
                .key_condition_expression("userId = :u")
                .expression_attribute_values(":u", AttributeValue::S(user_id.to_string()));

            if let Some(key) = last_evaluated_key {
                builder = builder.set_exclusive_start_key(Some(key));
            }

            let output = builder
                .send()
                .await
                .map_err(|e| StoreError::Storage(e.to_string()))?;

            for item in output.items() {
                if let Some(photo_key) = string_attr(item, "photoKey") {
                    markers.push(FavoriteMarker {
                        user_id: user_id.to_string(),
                        photo_key,
                        created_at: number_attr(item, "createdAt").unwrap_or(0),
                    });
                }
            }

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => {
                    last_evaluated_key = Some(key.clone());
                }
                _ => break,
            }
        }

        Ok(markers)
    }

    async fn counts_for_keys(
        &self,
        keys: &[String],
    ) -> Result<HashMap<String, u64>, StoreError> {
        let mut counts = HashMap::with_capacity(keys.len());

        for key in keys {
            let output = self
                .client
                .query()
                .table_name(&self.table)
                .index_name(FAVORITES_PHOTO_INDEX)
                .key_condition_expression("photoKey = :k")
                .expression_attribute_values(":k", AttributeValue::S(key.clone()))
                .select(Select::Count)
                .send()
                .await
                .map_err(|e| StoreError::Storage(e.to_string()))?;

            let count = output.count();
            if count > 0 {
                counts.insert(key.clone(), count as u64);
            }
        }

        Ok(counts)
    }
}

// =============================================================================
// Tags
// =============================================================================

/// DynamoDB-backed implementation of [`TagStore`].
#[derive(Clone)]
pub struct DynamoTagStore {
    client: Client,
    table: String,
}

impl DynamoTagStore {
    pub fn new(client: Client, table: String) -> Self {
        Self { client, table }
    }

    /// Get the table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    fn entry_key(user_id: &str, tag: &str) -> String {
        format!("{}#{}", user_id, tag)
    }
}

#[async_trait]
impl TagStore for DynamoTagStore {
    async fn add(&self, photo_key: &str, user_id: &str, tag: &str) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .item("photoKey", AttributeValue::S(photo_key.to_string()))
            .item("entry", AttributeValue::S(Self::entry_key(user_id, tag)))
            .item("userId", AttributeValue::S(user_id.to_string()))
            .item("tag", AttributeValue::S(tag.to_string()))
            .item("createdAt", AttributeValue::N(epoch_secs().to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn remove(&self, photo_key: &str, user_id: &str, tag: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .key("photoKey", AttributeValue::S(photo_key.to_string()))
            .key("entry", AttributeValue::S(Self::entry_key(user_id, tag)))
            .send()
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn list_for_photo(&self, photo_key: &str) -> Result<Vec<TagMarker>, StoreError> {
        let output = self
            .client
            .query()
            .table_name(&self.table)
            .key_condition_expression("photoKey = :k")
            .expression_attribute_values(":k", AttributeValue::S(photo_key.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        let markers = output
            .items()
            .iter()
            .filter_map(|item| {
                let user_id = string_attr(item, "userId")?;
                let tag = string_attr(item, "tag")?;
                Some(TagMarker {
                    photo_key: photo_key.to_string(),
                    user_id,
                    tag,
                    created_at: number_attr(item, "createdAt").unwrap_or(0),
                })
            })
            .collect();

        Ok(markers)
    }
}
