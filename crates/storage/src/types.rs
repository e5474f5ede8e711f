//! Shared data structures for bucket operations.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// HTTP status the service returns for a successful PUT, GET or LIST.
pub const HTTP_OK: u16 = 200;

/// HTTP status the service returns for a successful DELETE.
pub const HTTP_NO_CONTENT: u16 = 204;

/// Canned access-control list applied to an uploaded object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Permission {
    #[default]
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
    AwsExecRead,
    BucketOwnerRead,
    BucketOwnerFullControl,
}

impl Permission {
    /// Every canned ACL the service accepts.
    pub const ALL: [Permission; 7] = [
        Permission::Private,
        Permission::PublicRead,
        Permission::PublicReadWrite,
        Permission::AuthenticatedRead,
        Permission::AwsExecRead,
        Permission::BucketOwnerRead,
        Permission::BucketOwnerFullControl,
    ];

    /// Wire value of the ACL, e.g. `public-read`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Private => "private",
            Permission::PublicRead => "public-read",
            Permission::PublicReadWrite => "public-read-write",
            Permission::AuthenticatedRead => "authenticated-read",
            Permission::AwsExecRead => "aws-exec-read",
            Permission::BucketOwnerRead => "bucket-owner-read",
            Permission::BucketOwnerFullControl => "bucket-owner-full-control",
        }
    }

    /// Pick the effective permission for a request.
    ///
    /// A supplied value is used only when it exactly matches one of the
    /// canned ACLs (case-sensitive). Anything else, including `None`,
    /// silently falls back to `default`.
    ///
    /// # Arguments
    /// * `requested` - Caller-supplied permission, if any
    /// * `default` - Configured default permission
    pub fn resolve(requested: Option<&str>, default: Permission) -> Permission {
        requested
            .and_then(|value| value.parse().ok())
            .unwrap_or(default)
    }
}

impl FromStr for Permission {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| StorageError::invalid_config(format!("unknown permission {s:?}")))
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectBody {
    /// Zero-byte object, used for folder markers.
    Empty,
    /// Stream the file at this path.
    File(PathBuf),
}

/// A single PutObject call, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectRequest {
    /// Target bucket.
    pub bucket: String,
    /// Object key (never starts with `/`).
    pub key: String,
    /// Object content.
    pub body: ObjectBody,
    /// Canned ACL.
    pub acl: Permission,
    /// `Content-Type` of the stored object.
    pub content_type: Option<String>,
    /// `Cache-Control` served with the object.
    pub cache_control: Option<String>,
    /// `Content-Disposition` served with the object.
    pub content_disposition: Option<String>,
    /// `Content-Encoding` served with the object.
    pub content_encoding: Option<String>,
    /// `Content-Language` served with the object.
    pub content_language: Option<String>,
    /// Storage class, e.g. `STANDARD_IA`.
    pub storage_class: Option<String>,
    /// Server-side encryption algorithm (`AES256`, `aws:kms`, ...).
    pub server_side_encryption: Option<String>,
    /// KMS key id used when `server_side_encryption` is `aws:kms`.
    pub sse_kms_key_id: Option<String>,
    /// Object tags as a URL-encoded query string (`team=storage&env=prod`).
    pub tagging: Option<String>,
    /// `Expires` header, as an HTTP date.
    pub expires: Option<String>,
    /// Redirect target for website-hosted buckets.
    pub website_redirect_location: Option<String>,
    /// User metadata, sent as `x-amz-meta-*` headers.
    pub metadata: HashMap<String, String>,
    /// Raw HTTP headers added verbatim to the request.
    pub headers: Vec<(String, String)>,
}

impl PutObjectRequest {
    /// Create a request with no optional fields set.
    ///
    /// # Arguments
    /// * `bucket` - Target bucket
    /// * `key` - Object key
    /// * `body` - Object content
    /// * `acl` - Canned ACL
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        body: ObjectBody,
        acl: Permission,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            body,
            acl,
            content_type: None,
            cache_control: None,
            content_disposition: None,
            content_encoding: None,
            content_language: None,
            storage_class: None,
            server_side_encryption: None,
            sse_kms_key_id: None,
            tagging: None,
            expires: None,
            website_redirect_location: None,
            metadata: HashMap::new(),
            headers: Vec::new(),
        }
    }

    /// Merge one caller-supplied option into the request.
    ///
    /// Option names follow the PutObject argument names (`Bucket`, `Key`,
    /// `ACL`, `ContentType`, ...) and override the base request. Names
    /// starting with `x-amz-meta-` become user metadata, other hyphenated
    /// names (`x-amz-*` and the like) are sent as raw headers. Any other
    /// argument name is unsupported and dropped with a warning.
    ///
    /// # Arguments
    /// * `name` - Option name
    /// * `value` - Option value
    pub fn apply_option(&mut self, name: &str, value: &str) {
        match name {
            "Bucket" => self.bucket = value.to_string(),
            "Key" => self.key = value.to_string(),
            "ACL" => match value.parse::<Permission>() {
                Ok(acl) => self.acl = acl,
                Err(_) => log::warn!("Ignoring invalid ACL option {:?}", value),
            },
            "Body" => log::warn!("Ignoring Body option; the body comes from the local path"),
            "ContentType" => self.content_type = Some(value.to_string()),
            "CacheControl" => self.cache_control = Some(value.to_string()),
            "ContentDisposition" => self.content_disposition = Some(value.to_string()),
            "ContentEncoding" => self.content_encoding = Some(value.to_string()),
            "ContentLanguage" => self.content_language = Some(value.to_string()),
            "StorageClass" => self.storage_class = Some(value.to_string()),
            "ServerSideEncryption" => self.server_side_encryption = Some(value.to_string()),
            "SSEKMSKeyId" => self.sse_kms_key_id = Some(value.to_string()),
            "Tagging" => self.tagging = Some(value.to_string()),
            "Expires" => self.expires = Some(value.to_string()),
            "WebsiteRedirectLocation" => self.website_redirect_location = Some(value.to_string()),
            _ => match name.strip_prefix("x-amz-meta-") {
                Some(meta_key) if !meta_key.is_empty() => {
                    self.metadata.insert(meta_key.to_string(), value.to_string());
                }
                _ if name.contains('-') => self.headers.push((name.to_string(), value.to_string())),
                _ => log::warn!("Ignoring unsupported PutObject argument {:?}", name),
            },
        }
    }
}

/// Information about an object from list/head operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Object key.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
    /// Last modified timestamp (Unix epoch seconds).
    pub last_modified: Option<i64>,
    /// ETag (usually MD5 hash for non-multipart uploads).
    pub etag: Option<String>,
    /// Storage class reported by the service.
    pub storage_class: Option<String>,
}

/// Response of a single-object call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectResponse {
    /// HTTP status observed on the wire.
    pub status_code: u16,
}

impl ObjectResponse {
    /// Create a response with the given HTTP status.
    pub fn new(status_code: u16) -> Self {
        Self { status_code }
    }
}

/// Response of a ListObjects call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListObjectsResponse {
    /// HTTP status observed on the wire.
    pub status_code: u16,
    /// Objects in lexicographic key order.
    pub contents: Vec<ObjectInfo>,
    /// Whether more keys follow this page.
    pub is_truncated: bool,
}
