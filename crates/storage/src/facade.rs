//! High-level bucket client.
//!
//! [`BucketClient`] binds a validated [`ClientConfig`] to a [`StorageClient`]
//! backend and exposes the bucket operations callers use. Each operation
//! comes in two flavours:
//!
//! - `try_*` returns `Result<_, StorageError>` with the full failure detail.
//! - The plain name returns `bool` / `Option` and collapses every failure to
//!   `false` / `None`, logging the cause at `warn` level.
//!
//! Success of a remote call is decided strictly by its HTTP status: 200 for
//! uploads and listings, 200 or 204 for deletes.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::StorageError;
use crate::keys::{folder_key, normalize_key, parse_expiry, DEFAULT_URL_EXPIRY};
use crate::traits::StorageClient;
use crate::types::{
    ObjectBody, ObjectInfo, ObjectResponse, Permission, PutObjectRequest, HTTP_NO_CONTENT, HTTP_OK,
};

/// Bucket operations over a storage backend.
pub struct BucketClient<C: StorageClient> {
    config: ClientConfig,
    client: C,
}

impl<C: StorageClient> BucketClient<C> {
    /// Create a bucket client.
    ///
    /// # Arguments
    /// * `config` - Connection settings; validated here
    /// * `client` - Backend already bound to the same settings
    ///
    /// # Errors
    /// Returns `InvalidConfig` if access key, bucket or region is missing.
    pub fn new(config: ClientConfig, client: C) -> Result<Self, StorageError> {
        config.validate()?;
        Ok(Self { config, client })
    }

    /// Name of the bucket this client acts on.
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Settings this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The underlying backend.
    pub fn storage_client(&self) -> &C {
        &self.client
    }

    /// Upload a local file, or an empty object when `local_path` is empty.
    ///
    /// Returns `true` only if the service answered HTTP 200. A missing local
    /// file returns `false` without contacting the service.
    ///
    /// # Arguments
    /// * `local_path` - File to upload; empty for a zero-byte object
    /// * `remote_key` - Destination key
    /// * `permission` - Canned ACL; invalid or absent values use the default
    /// * `options` - Extra PutObject arguments, see [`PutObjectRequest::apply_option`]
    pub async fn put_object(
        &self,
        local_path: impl AsRef<Path>,
        remote_key: &str,
        permission: Option<&str>,
        options: Option<&HashMap<String, String>>,
    ) -> bool {
        let result = self
            .try_put_object(local_path, remote_key, permission, options)
            .await;
        collapse("put", remote_key, result).is_some()
    }

    /// Upload a local file, reporting why it failed.
    ///
    /// # Errors
    /// `LocalFileNotFound` if `local_path` is non-empty and missing,
    /// `UnexpectedStatus` for a non-200 answer, or the backend's error.
    pub async fn try_put_object(
        &self,
        local_path: impl AsRef<Path>,
        remote_key: &str,
        permission: Option<&str>,
        options: Option<&HashMap<String, String>>,
    ) -> Result<(), StorageError> {
        let request = self.build_put_request(local_path.as_ref(), remote_key, permission, options)?;

        log::debug!(
            "PutObject s3://{}/{} acl={}",
            request.bucket,
            request.key,
            request.acl
        );
        let response = self.client.put_object(&request).await?;
        expect_status(response, &[HTTP_OK])
    }

    fn build_put_request(
        &self,
        local_path: &Path,
        remote_key: &str,
        permission: Option<&str>,
        options: Option<&HashMap<String, String>>,
    ) -> Result<PutObjectRequest, StorageError> {
        let body = if local_path.as_os_str().is_empty() {
            ObjectBody::Empty
        } else if local_path.exists() {
            ObjectBody::File(local_path.to_path_buf())
        } else {
            return Err(StorageError::LocalFileNotFound {
                path: local_path.display().to_string(),
            });
        };

        let acl = Permission::resolve(permission, self.config.default_permission);
        let mut request =
            PutObjectRequest::new(&self.config.bucket, remote_key, body, acl);

        if let Some(options) = options {
            for (name, value) in options {
                request.apply_option(name, value);
            }
        }
        request.key = normalize_key(&request.key).to_string();

        Ok(request)
    }

    /// List objects whose keys sort after `marker`.
    ///
    /// This is start-after semantics, not a prefix filter: keys outside the
    /// "folder" that sort later are included. Returns `None` on any failure.
    ///
    /// # Arguments
    /// * `marker` - Key to start listing after
    pub async fn list_objects(&self, marker: &str) -> Option<Vec<ObjectInfo>> {
        collapse("list", marker, self.try_list_objects(marker).await)
    }

    /// List objects whose keys sort after `marker`, reporting failures.
    pub async fn try_list_objects(&self, marker: &str) -> Result<Vec<ObjectInfo>, StorageError> {
        log::debug!("ListObjects s3://{} marker={:?}", self.config.bucket, marker);
        let response = self.client.list_objects(&self.config.bucket, marker).await?;

        if response.status_code != HTTP_OK {
            return Err(StorageError::UnexpectedStatus {
                status: response.status_code,
            });
        }
        Ok(response.contents)
    }

    /// Build a presigned GET URL for `path`.
    ///
    /// # Arguments
    /// * `path` - Object key
    /// * `expiry` - Relative expiry such as `"+10 minutes"`; `None` means
    ///   [`DEFAULT_URL_EXPIRY`]
    pub async fn get_object_url(&self, path: &str, expiry: Option<&str>) -> Option<String> {
        let result = async {
            let expires_in = parse_expiry(expiry.unwrap_or(DEFAULT_URL_EXPIRY))?;
            self.try_get_object_url(path, expires_in).await
        }
        .await;
        collapse("presign", path, result)
    }

    /// Build a presigned GET URL valid for `expires_in`.
    ///
    /// # Errors
    /// Returns the backend's error if signing fails (e.g. expiry too long).
    pub async fn try_get_object_url(
        &self,
        path: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        self.client
            .presign_get_object(&self.config.bucket, normalize_key(path), expires_in)
            .await
    }

    /// Create a zero-byte folder marker at `path/`.
    ///
    /// # Arguments
    /// * `path` - Folder path; surrounding slashes are trimmed
    /// * `permission` - Canned ACL; invalid or absent values use the default
    pub async fn create_folder(&self, path: &str, permission: Option<&str>) -> bool {
        let key = folder_key(path);
        collapse("create folder", &key, self.try_create_folder(path, permission).await).is_some()
    }

    /// Create a zero-byte folder marker, reporting failures.
    pub async fn try_create_folder(
        &self,
        path: &str,
        permission: Option<&str>,
    ) -> Result<(), StorageError> {
        self.try_put_object("", &folder_key(path), permission, None)
            .await
    }

    /// Delete the object at `path`.
    pub async fn delete_object(&self, path: &str) -> bool {
        collapse("delete", path, self.try_delete_object(path).await).is_some()
    }

    /// Delete the object at `path`, reporting failures.
    pub async fn try_delete_object(&self, path: &str) -> Result<(), StorageError> {
        let key = normalize_key(path);
        log::debug!("DeleteObject s3://{}/{}", self.config.bucket, key);
        let response = self.client.delete_object(&self.config.bucket, key).await?;
        expect_status(response, &[HTTP_OK, HTTP_NO_CONTENT])
    }

    /// Whether an object exists at `path`. Failures count as absent.
    pub async fn object_exists(&self, path: &str) -> bool {
        matches!(
            collapse("head", path, self.try_object_info(path).await),
            Some(Some(_))
        )
    }

    /// Metadata of the object at `path`, `None` if it doesn't exist.
    pub async fn try_object_info(&self, path: &str) -> Result<Option<ObjectInfo>, StorageError> {
        self.client
            .head_object(&self.config.bucket, normalize_key(path))
            .await
    }
}

fn expect_status(response: ObjectResponse, accepted: &[u16]) -> Result<(), StorageError> {
    if accepted.contains(&response.status_code) {
        Ok(())
    } else {
        Err(StorageError::UnexpectedStatus {
            status: response.status_code,
        })
    }
}

/// Turn a failure into `None`, keeping the cause in the log.
fn collapse<T>(operation: &str, key: &str, result: Result<T, StorageError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("S3 {} failed for {:?}: {}", operation, key, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::types::ListObjectsResponse;

    /// In-memory backend that records calls and replays scripted answers.
    #[derive(Default)]
    struct MockStorageClient {
        puts: Mutex<Vec<PutObjectRequest>>,
        markers: Mutex<Vec<String>>,
        deletes: Mutex<Vec<String>>,
        status: Option<u16>,
        fault: Option<StorageError>,
        listing: Vec<ObjectInfo>,
        existing: Vec<String>,
    }

    impl MockStorageClient {
        fn answering(status: u16) -> Self {
            Self {
                status: Some(status),
                ..Self::default()
            }
        }

        fn failing(fault: StorageError) -> Self {
            Self {
                fault: Some(fault),
                ..Self::default()
            }
        }

        fn outcome(&self) -> Result<u16, StorageError> {
            match &self.fault {
                Some(fault) => Err(fault.clone()),
                None => Ok(self.status.unwrap_or(HTTP_OK)),
            }
        }

        fn put_count(&self) -> usize {
            self.puts.lock().unwrap().len()
        }

        fn last_put(&self) -> PutObjectRequest {
            self.puts.lock().unwrap().last().cloned().expect("no PutObject recorded")
        }
    }

    #[async_trait]
    impl StorageClient for MockStorageClient {
        async fn put_object(
            &self,
            request: &PutObjectRequest,
        ) -> Result<ObjectResponse, StorageError> {
            self.puts.lock().unwrap().push(request.clone());
            Ok(ObjectResponse::new(self.outcome()?))
        }

        async fn list_objects(
            &self,
            _bucket: &str,
            marker: &str,
        ) -> Result<ListObjectsResponse, StorageError> {
            self.markers.lock().unwrap().push(marker.to_string());
            Ok(ListObjectsResponse {
                status_code: self.outcome()?,
                contents: self.listing.clone(),
                is_truncated: false,
            })
        }

        async fn presign_get_object(
            &self,
            bucket: &str,
            key: &str,
            expires_in: Duration,
        ) -> Result<String, StorageError> {
            self.outcome()?;
            Ok(format!(
                "https://{bucket}.s3.amazonaws.com/{key}?X-Amz-Expires={}&X-Amz-Signature=abc",
                expires_in.as_secs()
            ))
        }

        async fn delete_object(
            &self,
            _bucket: &str,
            key: &str,
        ) -> Result<ObjectResponse, StorageError> {
            self.deletes.lock().unwrap().push(key.to_string());
            Ok(ObjectResponse::new(self.outcome()?))
        }

        async fn head_object(
            &self,
            _bucket: &str,
            key: &str,
        ) -> Result<Option<ObjectInfo>, StorageError> {
            self.outcome()?;
            Ok(self.existing.iter().any(|k| k == key).then(|| object(key)))
        }
    }

    fn object(key: &str) -> ObjectInfo {
        ObjectInfo {
            key: key.to_string(),
            size: 42,
            last_modified: Some(1_700_000_000),
            etag: Some("\"etag\"".to_string()),
            storage_class: Some("STANDARD".to_string()),
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::new("AKIA", "media", "eu-west-1")
    }

    fn bucket_client(mock: MockStorageClient) -> BucketClient<MockStorageClient> {
        BucketClient::new(config(), mock).unwrap()
    }

    fn temp_file(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        for config in [
            ClientConfig::new("", "media", "eu-west-1"),
            ClientConfig::new("AKIA", "", "eu-west-1"),
            ClientConfig::new("AKIA", "media", ""),
        ] {
            let result = BucketClient::new(config, MockStorageClient::default());
            assert!(matches!(result, Err(StorageError::InvalidConfig { .. })));
        }
    }

    #[tokio::test]
    async fn test_put_object_missing_file_skips_remote_call() {
        let client = bucket_client(MockStorageClient::default());

        let ok = client
            .put_object("/definitely/not/here.bin", "a/b.bin", None, None)
            .await;

        assert!(!ok);
        assert_eq!(client.storage_client().put_count(), 0);

        let err = client
            .try_put_object("/definitely/not/here.bin", "a/b.bin", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::LocalFileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_put_object_uploads_file() {
        let file = temp_file(b"hello");
        let client = bucket_client(MockStorageClient::default());

        assert!(client.put_object(file.path(), "/docs/hello.txt", None, None).await);

        let request = client.storage_client().last_put();
        assert_eq!(request.bucket, "media");
        assert_eq!(request.key, "docs/hello.txt");
        assert_eq!(request.body, ObjectBody::File(file.path().to_path_buf()));
        assert_eq!(request.acl, Permission::Private);
    }

    #[tokio::test]
    async fn test_put_object_empty_path_sends_empty_body() {
        let client = bucket_client(MockStorageClient::answering(200));

        assert!(client.put_object("", "marker", None, None).await);
        assert_eq!(client.storage_client().last_put().body, ObjectBody::Empty);
    }

    #[tokio::test]
    async fn test_put_object_permission_resolution() {
        let client = BucketClient::new(
            config().with_default_permission(Permission::AuthenticatedRead),
            MockStorageClient::default(),
        )
        .unwrap();

        assert!(client.put_object("", "a", Some("public-read"), None).await);
        assert_eq!(client.storage_client().last_put().acl, Permission::PublicRead);

        assert!(client.put_object("", "b", Some("nonsense"), None).await);
        assert_eq!(
            client.storage_client().last_put().acl,
            Permission::AuthenticatedRead
        );

        assert!(client.put_object("", "c", None, None).await);
        assert_eq!(
            client.storage_client().last_put().acl,
            Permission::AuthenticatedRead
        );
    }

    #[tokio::test]
    async fn test_put_object_options_override_base_request() {
        let client = bucket_client(MockStorageClient::default());
        let options: HashMap<String, String> = [
            ("Key", "override/key.txt"),
            ("ACL", "public-read-write"),
            ("ContentType", "text/plain"),
            ("x-amz-meta-origin", "import"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        assert!(client.put_object("", "base/key.txt", Some("private"), Some(&options)).await);

        let request = client.storage_client().last_put();
        assert_eq!(request.key, "override/key.txt");
        assert_eq!(request.acl, Permission::PublicReadWrite);
        assert_eq!(request.content_type.as_deref(), Some("text/plain"));
        assert_eq!(request.metadata.get("origin").map(String::as_str), Some("import"));
    }

    #[tokio::test]
    async fn test_put_object_key_override_is_normalized() {
        let client = bucket_client(MockStorageClient::default());
        let options: HashMap<String, String> =
            HashMap::from([("Key".to_string(), "//moved/x.txt".to_string())]);

        assert!(client.put_object("", "a.txt", None, Some(&options)).await);
        assert_eq!(client.storage_client().last_put().key, "moved/x.txt");
    }

    #[tokio::test]
    async fn test_put_object_non_200_is_false() {
        for status in [201, 204, 403, 500] {
            let client = bucket_client(MockStorageClient::answering(status));
            assert!(!client.put_object("", "a", None, None).await);

            let err = client.try_put_object("", "a", None, None).await.unwrap_err();
            assert_eq!(err, StorageError::UnexpectedStatus { status });
        }
    }

    #[tokio::test]
    async fn test_put_object_fault_is_swallowed() {
        let fault = StorageError::ServiceError {
            status: Some(403),
            message: "AccessDenied".into(),
        };
        let client = bucket_client(MockStorageClient::failing(fault.clone()));

        assert!(!client.put_object("", "a", None, None).await);
        assert_eq!(client.try_put_object("", "a", None, None).await, Err(fault));
    }

    #[tokio::test]
    async fn test_list_objects_returns_contents() {
        let mock = MockStorageClient {
            listing: vec![object("prefix/a"), object("prefix/b"), object("prefix/c")],
            ..MockStorageClient::default()
        };
        let client = bucket_client(mock);

        let listed = client.list_objects("prefix/").await.unwrap();
        assert_eq!(
            listed.iter().map(|o| o.key.as_str()).collect::<Vec<_>>(),
            vec!["prefix/a", "prefix/b", "prefix/c"]
        );
        assert_eq!(*client.storage_client().markers.lock().unwrap(), vec!["prefix/"]);
    }

    #[tokio::test]
    async fn test_list_objects_failure_is_none() {
        for status in [403, 500] {
            let mock = MockStorageClient {
                listing: vec![object("x")],
                ..MockStorageClient::answering(status)
            };
            let client = bucket_client(mock);
            assert_eq!(client.list_objects("prefix/").await, None);
        }

        let client = bucket_client(MockStorageClient::failing(StorageError::ServiceError {
            status: None,
            message: "connection refused".into(),
        }));
        assert_eq!(client.list_objects("prefix/").await, None);
    }

    #[tokio::test]
    async fn test_create_folder_uploads_marker() {
        let client = bucket_client(MockStorageClient::default());

        assert!(client.create_folder("a/b", None).await);
        let request = client.storage_client().last_put();
        assert_eq!(request.key, "a/b/");
        assert_eq!(request.body, ObjectBody::Empty);
        assert_eq!(request.acl, Permission::Private);

        assert!(client.create_folder("/a/b//", Some("public-read")).await);
        let request = client.storage_client().last_put();
        assert_eq!(request.key, "a/b/");
        assert_eq!(request.acl, Permission::PublicRead);
    }

    #[tokio::test]
    async fn test_create_folder_failure_is_false() {
        let client = bucket_client(MockStorageClient::answering(500));
        assert!(!client.create_folder("a/b", None).await);
    }

    #[tokio::test]
    async fn test_get_object_url_default_expiry() {
        let client = bucket_client(MockStorageClient::default());

        let url = client.get_object_url("/a/b.txt", None).await.unwrap();
        assert!(url.contains("/a/b.txt?"));
        assert!(url.contains("X-Amz-Expires=120"));
    }

    #[tokio::test]
    async fn test_get_object_url_custom_expiry() {
        let client = bucket_client(MockStorageClient::default());

        let url = client.get_object_url("a/b.txt", Some("+10 minutes")).await.unwrap();
        assert!(url.contains("a/b.txt"));
        assert!(url.contains("X-Amz-Expires=600"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[tokio::test]
    async fn test_get_object_url_failures_are_none() {
        let client = bucket_client(MockStorageClient::default());
        assert_eq!(client.get_object_url("a", Some("whenever")).await, None);

        let client = bucket_client(MockStorageClient::failing(StorageError::PresignError {
            message: "expiry too long".into(),
        }));
        assert_eq!(client.get_object_url("a", None).await, None);
    }

    #[tokio::test]
    async fn test_delete_object_accepts_204() {
        let client = bucket_client(MockStorageClient::answering(204));
        assert!(client.delete_object("/a/b.txt").await);
        assert_eq!(*client.storage_client().deletes.lock().unwrap(), vec!["a/b.txt"]);

        let client = bucket_client(MockStorageClient::answering(403));
        assert!(!client.delete_object("a/b.txt").await);
    }

    #[tokio::test]
    async fn test_object_exists() {
        let mock = MockStorageClient {
            existing: vec!["a/b.txt".to_string()],
            ..MockStorageClient::default()
        };
        let client = bucket_client(mock);

        assert!(client.object_exists("a/b.txt").await);
        assert!(client.object_exists("/a/b.txt").await);
        assert!(!client.object_exists("a/c.txt").await);

        let client = bucket_client(MockStorageClient::failing(StorageError::ServiceError {
            status: Some(500),
            message: "InternalError".into(),
        }));
        assert!(!client.object_exists("a/b.txt").await);
    }
}
