//! Error types for S3 operations

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for S3 operations
pub type S3Result<T> = Result<T, S3Error>;

/// Errors that can occur during S3 operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum S3Error {
    /// AWS SDK error
    #[error("AWS SDK error: {0}")]
    Sdk(String),

    /// S3 service error with specific error code
    #[error("S3 service error ({code}): {message}")]
    Service { code: String, message: String },

    /// Object not found in bucket
    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// Bucket not found or not accessible
    #[error("Bucket not found or not accessible: {0}")]
    BucketNotFound(String),

    /// Access denied error
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid bucket name
    #[error("Invalid bucket name: {0}")]
    InvalidBucketName(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),
}

impl S3Error {
    /// Whether this error means the object itself is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, S3Error::NotFound { .. })
    }
}

// Convert io::Error to S3Error
impl From<io::Error> for S3Error {
    fn from(err: io::Error) -> Self {
        S3Error::Io(err.to_string())
    }
}

/// Convert AWS SDK errors to S3Error
///
/// Operation-specific "not found" variants are mapped at the call site, where
/// the bucket and key are known.
impl<E, R> From<SdkError<E, R>> for S3Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: fmt::Debug,
{
    fn from(error: SdkError<E, R>) -> Self {
        match &error {
            SdkError::DispatchFailure(e) => {
                S3Error::Network(format!("Network dispatch failure: {:?}", e))
            }
            SdkError::TimeoutError(_) => S3Error::Network("Request timed out".to_string()),
            SdkError::ResponseError(e) => S3Error::Network(format!("Response error: {:?}", e)),
            SdkError::ServiceError(e) => {
                let err = e.err();
                let code = err.code().unwrap_or("Unknown").to_string();
                let message = err
                    .message()
                    .map(str::to_string)
                    .unwrap_or_else(|| DisplayErrorContext(err).to_string());

                match code.as_str() {
                    "AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch" => {
                        S3Error::AccessDenied(message)
                    }
                    "NoSuchBucket" => S3Error::BucketNotFound(message),
                    _ => S3Error::Service { code, message },
                }
            }
            _ => S3Error::Sdk(DisplayErrorContext(&error).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        let err = S3Error::NotFound {
            bucket: "files".to_string(),
            key: "missing.bin".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!S3Error::BucketNotFound("files".to_string()).is_not_found());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let s3_err: S3Error = io_err.into();
        assert!(matches!(s3_err, S3Error::Io(_)));
    }

    #[test]
    fn test_error_display_formats() {
        let err = S3Error::Network("connection lost".to_string());
        assert_eq!(format!("{}", err), "Network error: connection lost");

        let err = S3Error::Service {
            code: "QuotaExceeded".to_string(),
            message: "bucket full".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "S3 service error (QuotaExceeded): bucket full"
        );

        let err = S3Error::NotFound {
            bucket: "my-bucket".to_string(),
            key: "my-key".to_string(),
        };
        assert_eq!(format!("{}", err), "Object not found: my-bucket/my-key");

        let err = S3Error::AccessDenied("no perms".to_string());
        assert_eq!(format!("{}", err), "Access denied: no perms");

        let err = S3Error::InvalidBucketName("bad!name".to_string());
        assert_eq!(format!("{}", err), "Invalid bucket name: bad!name");
    }
}
