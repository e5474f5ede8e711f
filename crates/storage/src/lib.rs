//! Storage abstraction for single-bucket S3 operations.
//!
//! This crate provides a backend-agnostic bucket client: configuration,
//! canned-ACL handling, and the upload / list / presign / folder operations.
//! The actual remote calls go through the [`StorageClient`] trait, which is
//! implemented for the AWS SDK in `rusty-bucket-storage-crt`.
//!
//! # Example
//!
//! ```ignore
//! use rusty_bucket_storage::{BucketClient, ClientConfig};
//!
//! let config = ClientConfig::from_env()?;
//! let client = BucketClient::new(config, backend)?;
//!
//! client.create_folder("reports/2024", None).await;
//! client.put_object("q1.pdf", "reports/2024/q1.pdf", Some("public-read"), None).await;
//! let url = client.get_object_url("reports/2024/q1.pdf", Some("+10 minutes")).await;
//! ```

mod config;
mod error;
mod facade;
mod keys;
mod traits;
mod types;

pub use config::{ClientConfig, DEFAULT_API_VERSION, DEFAULT_ENV_PREFIX, DEFAULT_SETTINGS_GROUP};
pub use error::StorageError;
pub use facade::BucketClient;
pub use keys::{folder_key, normalize_key, parse_expiry, DEFAULT_URL_EXPIRY};
pub use traits::StorageClient;
pub use types::{
    ListObjectsResponse, ObjectBody, ObjectInfo, ObjectResponse, Permission, PutObjectRequest,
    HTTP_NO_CONTENT, HTTP_OK,
};
