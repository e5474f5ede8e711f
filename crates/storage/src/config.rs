//! Client configuration and its loaders.
//!
//! A [`ClientConfig`] can be built in code, read from a named group of a JSON
//! settings document, or read from environment variables (with `.env`
//! support). Every loader validates the result before handing it out.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::types::Permission;

/// S3 API version the client speaks.
pub const DEFAULT_API_VERSION: &str = "2006-03-01";

/// Conventional settings group name for [`ClientConfig::from_settings`].
///
/// Any group name can be passed; documents that keep their settings under
/// another name (e.g. `CakephpAmazonS3`) work the same way.
pub const DEFAULT_SETTINGS_GROUP: &str = "AmazonS3";

/// Environment variable prefix used by [`ClientConfig::from_env`].
pub const DEFAULT_ENV_PREFIX: &str = "AMAZON_S3";

/// Connection settings for one bucket.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Access key id.
    #[serde(alias = "key")]
    pub access_key: String,
    /// Secret access key.
    #[serde(alias = "secret")]
    pub secret_key: String,
    /// Bucket all operations act on.
    pub bucket: String,
    /// Region the bucket lives in.
    pub region: String,
    /// Custom endpoint URL (S3-compatible services).
    pub endpoint: Option<String>,
    /// S3 API version, reported when the client is built.
    pub api_version: String,
    /// ACL applied when a caller passes none or an invalid one.
    pub default_permission: Permission,
    /// Address buckets as `endpoint/bucket` instead of `bucket.endpoint`.
    pub force_path_style: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            access_key: String::new(),
            secret_key: String::new(),
            bucket: String::new(),
            region: String::new(),
            endpoint: None,
            api_version: DEFAULT_API_VERSION.into(),
            default_permission: Permission::default(),
            force_path_style: false,
        }
    }
}

// Keep the secret out of logs.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("default_permission", &self.default_permission)
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

impl ClientConfig {
    /// Create a config with the required fields and defaults for the rest.
    ///
    /// # Arguments
    /// * `access_key` - Access key id
    /// * `bucket` - Bucket name
    /// * `region` - Bucket region
    pub fn new(
        access_key: impl Into<String>,
        bucket: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            bucket: bucket.into(),
            region: region.into(),
            ..Self::default()
        }
    }

    /// Set the secret access key.
    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = secret_key.into();
        self
    }

    /// Set a custom endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the API version string.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Set the ACL used when callers pass none or an invalid one.
    pub fn with_default_permission(mut self, permission: Permission) -> Self {
        self.default_permission = permission;
        self
    }

    /// Use path-style bucket addressing (needed by most S3-compatible servers).
    pub fn with_force_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = force_path_style;
        self
    }

    /// Check that access key, bucket and region are present.
    ///
    /// # Errors
    /// Returns `InvalidConfig` naming every missing field.
    pub fn validate(&self) -> Result<(), StorageError> {
        let missing: Vec<&str> = [
            ("access key", &self.access_key),
            ("bucket", &self.bucket),
            ("region", &self.region),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(StorageError::invalid_config(format!(
                "missing {}",
                missing.join(", ")
            )))
        }
    }

    /// Read a named group out of a JSON settings document.
    ///
    /// # Arguments
    /// * `json` - Settings document, e.g. `{"AmazonS3": {"bucket": ...}}`
    /// * `group` - Name of the group holding the client settings
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the document is malformed, the group is
    /// missing, or the resulting config fails validation.
    pub fn from_settings(json: &str, group: &str) -> Result<Self, StorageError> {
        let mut document: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| StorageError::invalid_config(format!("malformed settings: {e}")))?;

        let section = document
            .get_mut(group)
            .map(serde_json::Value::take)
            .ok_or_else(|| StorageError::invalid_config(format!("settings group {group:?} not found")))?;

        let config: ClientConfig = serde_json::from_value(section)
            .map_err(|e| StorageError::invalid_config(format!("settings group {group:?}: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Read the config from `AMAZON_S3_*` environment variables.
    ///
    /// A `.env` file in the working directory (or a parent) is loaded first
    /// if one exists.
    pub fn from_env() -> Result<Self, StorageError> {
        Self::from_env_prefixed(DEFAULT_ENV_PREFIX)
    }

    /// Read the config from `<prefix>_*` environment variables.
    ///
    /// # Arguments
    /// * `prefix` - Variable prefix, e.g. `"AMAZON_S3"`
    pub fn from_env_prefixed(prefix: &str) -> Result<Self, StorageError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                log::warn!("Failed to load .env file: {}", e);
            }
        }
        Self::from_lookup(prefix, |name| std::env::var(name).ok())
    }

    fn from_lookup<F>(prefix: &str, lookup: F) -> Result<Self, StorageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| lookup(&format!("{prefix}_{suffix}")).filter(|v| !v.is_empty());
        let mut config = ClientConfig::default();

        if let Some(value) = var("ACCESS_KEY") {
            config.access_key = value;
        }
        if let Some(value) = var("SECRET_KEY") {
            config.secret_key = value;
        }
        if let Some(value) = var("BUCKET") {
            config.bucket = value;
        }
        if let Some(value) = var("REGION") {
            config.region = value;
        }
        config.endpoint = var("ENDPOINT");
        if let Some(value) = var("API_VERSION") {
            config.api_version = value;
        }
        if let Some(value) = var("DEFAULT_PERMISSION") {
            config.default_permission = value.parse()?;
        }
        if let Some(value) = var("FORCE_PATH_STYLE") {
            config.force_path_style = parse_bool(&value).ok_or_else(|| {
                StorageError::invalid_config(format!(
                    "{prefix}_FORCE_PATH_STYLE must be a boolean, got {value:?}"
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
