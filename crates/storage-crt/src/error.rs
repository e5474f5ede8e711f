//! Error types for CRT storage operations.

use rusty_bucket_storage::StorageError;
use thiserror::Error;

/// Errors specific to the CRT storage client.
#[derive(Error, Debug)]
pub enum CrtError {
    /// AWS SDK error.
    #[error("AWS SDK error: {message}")]
    SdkError { status: Option<u16>, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Failed to open a local file as an upload body.
    #[error("I/O error for {path}: {message}")]
    IoError { path: String, message: String },

    /// A PutObject argument could not be converted for the SDK.
    #[error("Invalid {name} argument: {message}")]
    InvalidArgument { name: String, message: String },

    /// Presigning a request failed.
    #[error("Presign error: {0}")]
    PresignError(String),
}

impl From<CrtError> for StorageError {
    fn from(err: CrtError) -> Self {
        match err {
            CrtError::SdkError { status, message } => StorageError::ServiceError { status, message },
            CrtError::ConfigError(message) => StorageError::InvalidConfig { message },
            CrtError::IoError { path, message } => StorageError::IoError { path, message },
            CrtError::InvalidArgument { name, message } => {
                StorageError::InvalidArgument { name, message }
            }
            CrtError::PresignError(message) => StorageError::PresignError { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_error_keeps_status() {
        let err: StorageError = CrtError::SdkError {
            status: Some(403),
            message: "AccessDenied".into(),
        }
        .into();
        assert_eq!(err.status_code(), Some(403));
    }

    #[test]
    fn test_config_error_maps_to_invalid_config() {
        let err: StorageError = CrtError::ConfigError("bad endpoint".into()).into();
        assert_eq!(err, StorageError::InvalidConfig { message: "bad endpoint".into() });
    }
}
