//! Storage traits/interfaces for bucket operations.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::types::{ListObjectsResponse, ObjectInfo, ObjectResponse, PutObjectRequest};

/// Low-level object-storage calls - implemented by each backend.
///
/// Every method is exactly one remote call. Backends report the HTTP status
/// they saw so callers can decide what counts as success; they do not retry.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Upload one object.
    async fn put_object(&self, request: &PutObjectRequest) -> Result<ObjectResponse, StorageError>;

    /// List objects whose keys sort after `marker` (ListObjects v1 start-after).
    async fn list_objects(
        &self,
        bucket: &str,
        marker: &str,
    ) -> Result<ListObjectsResponse, StorageError>;

    /// Build a time-limited signed GET URL. No request is sent.
    async fn presign_get_object(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError>;

    /// Delete one object.
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<ObjectResponse, StorageError>;

    /// Fetch object metadata.
    /// Returns None if the object doesn't exist.
    async fn head_object(&self, bucket: &str, key: &str)
        -> Result<Option<ObjectInfo>, StorageError>;
}
