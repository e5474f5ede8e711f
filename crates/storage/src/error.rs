//! Error types for bucket operations.

use thiserror::Error;

/// Errors that can occur while configuring or using a bucket client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Required configuration is missing or malformed.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The local file to upload does not exist.
    #[error("Local file not found: {path}")]
    LocalFileNotFound { path: String },

    /// Local I/O error.
    #[error("I/O error for {path}: {message}")]
    IoError { path: String, message: String },

    /// Fault raised by the remote storage service or its SDK.
    #[error("Storage service error{}: {message}", status_suffix(.status))]
    ServiceError {
        status: Option<u16>,
        message: String,
    },

    /// The service answered, but not with the expected success status.
    #[error("Unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },

    /// A URL expiry expression could not be parsed.
    #[error("Invalid expiry: {value:?}")]
    InvalidExpiry { value: String },

    /// A request argument has a value the backend cannot send.
    #[error("Invalid {name} argument: {message}")]
    InvalidArgument { name: String, message: String },

    /// Building a presigned URL failed.
    #[error("Presign error: {message}")]
    PresignError { message: String },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl StorageError {
    /// Create an invalid configuration error.
    ///
    /// # Arguments
    /// * `message` - Description of what is wrong
    pub fn invalid_config(message: impl Into<String>) -> Self {
        StorageError::InvalidConfig {
            message: message.into(),
        }
    }

    /// HTTP status associated with this error, if the service answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            StorageError::ServiceError { status, .. } => *status,
            StorageError::UnexpectedStatus { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::IoError {
            path: String::new(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display_with_status() {
        let err = StorageError::ServiceError {
            status: Some(403),
            message: "AccessDenied".into(),
        };
        assert_eq!(err.to_string(), "Storage service error (HTTP 403): AccessDenied");
        assert_eq!(err.status_code(), Some(403));
    }

    #[test]
    fn test_service_error_display_without_status() {
        let err = StorageError::ServiceError {
            status: None,
            message: "dispatch failure".into(),
        };
        assert_eq!(err.to_string(), "Storage service error: dispatch failure");
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_status_code_for_local_errors() {
        let err = StorageError::LocalFileNotFound {
            path: "/tmp/missing".into(),
        };
        assert_eq!(err.status_code(), None);
        assert_eq!(StorageError::UnexpectedStatus { status: 500 }.status_code(), Some(500));
    }
}
