//! AWS SDK S3 client implementation.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::{ByteStream, DateTime, DateTimeFormat};
use aws_sdk_s3::types::{ObjectCannedAcl, ServerSideEncryption, StorageClass};
use aws_sdk_s3::Client as S3Client;
use aws_smithy_runtime_api::box_error::BoxError;
use aws_smithy_runtime_api::client::interceptors::context::BeforeDeserializationInterceptorContextRef;
use aws_smithy_runtime_api::client::interceptors::Intercept;
use aws_smithy_runtime_api::client::orchestrator::{HttpRequest, HttpResponse};
use aws_smithy_runtime_api::client::runtime_components::RuntimeComponents;
use aws_smithy_types::config_bag::ConfigBag;

use rusty_bucket_storage::{
    ClientConfig, ListObjectsResponse, ObjectBody, ObjectInfo, ObjectResponse, PutObjectRequest,
    StorageClient, StorageError,
};

use crate::error::CrtError;

/// Provider name attached to the static credentials.
const CREDENTIALS_PROVIDER: &str = "rusty-bucket";

/// StorageClient implementation using AWS SDK for Rust.
///
/// SDK retries are disabled: every trait call is exactly one HTTP exchange,
/// and the status of that exchange is reported back to the caller.
#[derive(Debug, Clone)]
pub struct CrtStorageClient {
    /// The underlying S3 client.
    s3_client: S3Client,
}

impl CrtStorageClient {
    /// Create a client bound to the credentials, region and endpoint in `config`.
    ///
    /// No request is sent; the connection is opened lazily on first use.
    ///
    /// # Arguments
    /// * `config` - Validated client configuration
    ///
    /// # Errors
    /// Returns `InvalidConfig` if required fields are missing or the
    /// endpoint is not an http(s) URL.
    pub async fn new(config: &ClientConfig) -> Result<Self, StorageError> {
        config.validate()?;

        let endpoint = config.endpoint.as_deref().filter(|e| !e.trim().is_empty());
        if let Some(endpoint) = endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(CrtError::ConfigError(format!(
                    "endpoint must be an http(s) URL, got {endpoint:?}"
                ))
                .into());
            }
        }

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            CREDENTIALS_PROVIDER,
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .retry_config(RetryConfig::disabled())
            .force_path_style(config.force_path_style);

        if let Some(endpoint) = endpoint {
            s3_config = s3_config.endpoint_url(endpoint);
        }

        log::info!(
            "S3 client initialized for bucket: {}, region: {}, endpoint: {}, api version: {}",
            config.bucket,
            config.region,
            endpoint.unwrap_or("<default>"),
            config.api_version
        );

        Ok(Self {
            s3_client: S3Client::from_conf(s3_config.build()),
        })
    }

    /// Create a client from an existing S3Client.
    ///
    /// # Arguments
    /// * `s3_client` - Pre-configured S3 client
    pub fn from_client(s3_client: S3Client) -> Self {
        Self { s3_client }
    }
}

/// Records the HTTP status of the response an operation received.
#[derive(Debug, Clone, Default)]
struct StatusRecorder(Arc<AtomicU16>);

impl StatusRecorder {
    fn status(&self) -> u16 {
        self.0.load(Ordering::Acquire)
    }
}

impl Intercept for StatusRecorder {
    fn name(&self) -> &'static str {
        "StatusRecorder"
    }

    fn read_before_deserialization(
        &self,
        context: &BeforeDeserializationInterceptorContextRef<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> Result<(), BoxError> {
        self.0
            .store(context.response().status().as_u16(), Ordering::Release);
        Ok(())
    }
}

fn sdk_error<E>(err: SdkError<E, HttpResponse>) -> CrtError
where
    E: std::error::Error + 'static,
{
    CrtError::SdkError {
        status: err.raw_response().map(|r| r.status().as_u16()),
        message: DisplayErrorContext(&err).to_string(),
    }
}

/// Add raw headers to an outgoing request, dropping any that are not valid HTTP.
fn insert_headers(http_request: &mut HttpRequest, headers: &[(String, String)]) {
    for (name, value) in headers {
        if let Err(e) = http_request
            .headers_mut()
            .try_insert(name.clone(), value.clone())
        {
            log::warn!("Dropping invalid header {}: {}", name, e);
        }
    }
}

fn epoch_seconds(dt: Option<&DateTime>) -> Option<i64> {
    dt.and_then(|dt| dt.to_millis().ok()).map(|ms| ms / 1000)
}

#[async_trait]
impl StorageClient for CrtStorageClient {
    async fn put_object(&self, request: &PutObjectRequest) -> Result<ObjectResponse, StorageError> {
        let body = match &request.body {
            ObjectBody::Empty => ByteStream::from_static(b""),
            ObjectBody::File(path) => {
                ByteStream::from_path(path)
                    .await
                    .map_err(|e| CrtError::IoError {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    })?
            }
        };

        let mut builder = self
            .s3_client
            .put_object()
            .bucket(&request.bucket)
            .key(&request.key)
            .body(body)
            .acl(ObjectCannedAcl::from(request.acl.as_str()))
            .set_content_type(request.content_type.clone())
            .set_cache_control(request.cache_control.clone())
            .set_content_disposition(request.content_disposition.clone())
            .set_content_encoding(request.content_encoding.clone())
            .set_content_language(request.content_language.clone());

        if let Some(ref class) = request.storage_class {
            builder = builder.storage_class(StorageClass::from(class.as_str()));
        }

        if let Some(ref sse) = request.server_side_encryption {
            builder = builder.server_side_encryption(ServerSideEncryption::from(sse.as_str()));
        }

        if let Some(ref expires) = request.expires {
            let expires = DateTime::from_str(expires, DateTimeFormat::HttpDate).map_err(|e| {
                CrtError::InvalidArgument {
                    name: "Expires".into(),
                    message: e.to_string(),
                }
            })?;
            builder = builder.expires(expires);
        }

        builder = builder
            .set_ssekms_key_id(request.sse_kms_key_id.clone())
            .set_tagging(request.tagging.clone())
            .set_website_redirect_location(request.website_redirect_location.clone());

        for (k, v) in &request.metadata {
            builder = builder.metadata(k, v);
        }

        let recorder = StatusRecorder::default();
        let mut operation = builder.customize().interceptor(recorder.clone());

        if !request.headers.is_empty() {
            let headers = request.headers.clone();
            operation = operation
                .mutate_request(move |http_request| insert_headers(http_request, &headers));
        }

        operation.send().await.map_err(sdk_error)?;

        Ok(ObjectResponse::new(recorder.status()))
    }

    async fn list_objects(
        &self,
        bucket: &str,
        marker: &str,
    ) -> Result<ListObjectsResponse, StorageError> {
        let recorder = StatusRecorder::default();

        let response = self
            .s3_client
            .list_objects()
            .bucket(bucket)
            .set_marker((!marker.is_empty()).then(|| marker.to_string()))
            .customize()
            .interceptor(recorder.clone())
            .send()
            .await
            .map_err(sdk_error)?;

        let contents: Vec<ObjectInfo> = response
            .contents()
            .iter()
            .map(|obj| ObjectInfo {
                key: obj.key().unwrap_or_default().to_string(),
                size: obj.size().map(|s| s as u64).unwrap_or(0),
                last_modified: epoch_seconds(obj.last_modified()),
                etag: obj.e_tag().map(|s| s.to_string()),
                storage_class: obj.storage_class().map(|c| c.as_str().to_string()),
            })
            .collect();

        Ok(ListObjectsResponse {
            status_code: recorder.status(),
            contents,
            is_truncated: response.is_truncated() == Some(true),
        })
    }

    async fn presign_get_object(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| CrtError::PresignError(e.to_string()))?;

        let presigned = self
            .s3_client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| CrtError::PresignError(DisplayErrorContext(&e).to_string()))?;

        Ok(presigned.uri().to_string())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<ObjectResponse, StorageError> {
        let recorder = StatusRecorder::default();

        self.s3_client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .customize()
            .interceptor(recorder.clone())
            .send()
            .await
            .map_err(sdk_error)?;

        Ok(ObjectResponse::new(recorder.status()))
    }

    async fn head_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<ObjectInfo>, StorageError> {
        match self.s3_client.head_object().bucket(bucket).key(key).send().await {
            Ok(output) => Ok(Some(ObjectInfo {
                key: key.to_string(),
                size: output.content_length().map(|l| l as u64).unwrap_or(0),
                last_modified: epoch_seconds(output.last_modified()),
                etag: output.e_tag().map(|s| s.to_string()),
                storage_class: output.storage_class().map(|c| c.as_str().to_string()),
            })),
            Err(SdkError::ServiceError(service)) if service.err().is_not_found() => Ok(None),
            Err(err) => Err(sdk_error(err).into()),
        }
    }
}
