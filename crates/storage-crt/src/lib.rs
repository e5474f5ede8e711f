//! AWS SDK S3 backend for rusty-bucket storage.
//!
//! This crate provides a `StorageClient` implementation using the AWS SDK for Rust,
//! and [`connect`], which turns a [`ClientConfig`] into a ready [`BucketClient`].
//!
//! # Example
//!
//! ```ignore
//! use rusty_bucket_storage::ClientConfig;
//! use rusty_bucket_storage_crt::connect;
//!
//! let config = ClientConfig::from_env()?;
//! let bucket = connect(config).await?;
//!
//! if bucket.put_object("report.pdf", "reports/report.pdf", None, None).await {
//!     let url = bucket.get_object_url("reports/report.pdf", None).await;
//! }
//! ```

mod client;
mod error;

pub use client::CrtStorageClient;
pub use error::CrtError;

use rusty_bucket_storage::{BucketClient, ClientConfig, StorageError};

/// Build an AWS-backed bucket client from `config`.
///
/// # Arguments
/// * `config` - Connection settings
///
/// # Errors
/// Returns `InvalidConfig` if access key, bucket or region is missing, or
/// the endpoint is malformed.
pub async fn connect(config: ClientConfig) -> Result<BucketClient<CrtStorageClient>, StorageError> {
    let client = CrtStorageClient::new(&config).await?;
    BucketClient::new(config, client)
}
