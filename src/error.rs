/*!
 * Error types for Ferry
 */

use std::fmt;
use std::io;

use serde::Serialize;

use crate::protocol::s3::S3Error;

pub type Result<T> = std::result::Result<T, TransferError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;

#[derive(Debug)]
pub enum TransferError {
    /// Malformed input; retrying the same request cannot succeed
    InvalidRequest(String),

    /// Remote source could not be fetched
    Fetch { url: String, reason: String },

    /// Object absent from the backend
    NotFound { bucket: String, key: String },

    /// Buffering the body into memory failed
    Staging(io::Error),

    /// Backend rejected a put
    Write(S3Error),

    /// Backend transport, auth or bucket failure outside of a put
    Backend(S3Error),

    /// Gateway routing miss
    UnknownFunction(String),

    /// Start-up configuration is missing or invalid
    Configuration(String),
}

impl TransferError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            TransferError::Configuration(_) => EXIT_CONFIG,
            _ => EXIT_FAILURE,
        }
    }

    /// Get error category for logging and for the wire `errorType`
    pub fn category(&self) -> ErrorCategory {
        match self {
            TransferError::InvalidRequest(_) => ErrorCategory::InvalidRequest,
            TransferError::Fetch { .. } => ErrorCategory::Fetch,
            TransferError::NotFound { .. } => ErrorCategory::NotFound,
            TransferError::Staging(_) => ErrorCategory::Staging,
            TransferError::Write(_) => ErrorCategory::Write,
            TransferError::Backend(_) => ErrorCategory::Backend,
            TransferError::UnknownFunction(_) => ErrorCategory::UnknownFunction,
            TransferError::Configuration(_) => ErrorCategory::Configuration,
        }
    }

    /// Whether the caller is at fault (resending the same event is pointless)
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            TransferError::InvalidRequest(_) | TransferError::UnknownFunction(_)
        )
    }

    /// Build the structured response returned to the invoker
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error_type: self.category().to_string(),
            error_message: self.to_string(),
        }
    }
}

/// Error category for classification and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidRequest,
    Fetch,
    NotFound,
    Staging,
    Write,
    Backend,
    UnknownFunction,
    Configuration,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::InvalidRequest => write!(f, "InvalidRequest"),
            ErrorCategory::Fetch => write!(f, "FetchError"),
            ErrorCategory::NotFound => write!(f, "NotFound"),
            ErrorCategory::Staging => write!(f, "StagingError"),
            ErrorCategory::Write => write!(f, "WriteError"),
            ErrorCategory::Backend => write!(f, "BackendError"),
            ErrorCategory::UnknownFunction => write!(f, "UnknownFunction"),
            ErrorCategory::Configuration => write!(f, "ConfigurationError"),
        }
    }
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::InvalidRequest(msg) => {
                write!(f, "Invalid request: {}", msg)
            }
            TransferError::Fetch { url, reason } => {
                write!(f, "Failed to fetch {}: {}", url, reason)
            }
            TransferError::NotFound { bucket, key } => {
                write!(f, "Object not found: {}/{}", bucket, key)
            }
            TransferError::Staging(err) => {
                write!(f, "Staging error: {}", err)
            }
            TransferError::Write(err) => {
                write!(f, "Write failed: {}", err)
            }
            TransferError::Backend(err) => {
                write!(f, "Backend error: {}", err)
            }
            TransferError::UnknownFunction(name) => {
                write!(f, "function type \"{}\" is invalid", name)
            }
            TransferError::Configuration(msg) => {
                write!(f, "Configuration error: {}", msg)
            }
        }
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransferError::Staging(err) => Some(err),
            TransferError::Write(err) | TransferError::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TransferError {
    fn from(err: serde_json::Error) -> Self {
        TransferError::InvalidRequest(format!("JSON parse error: {}", err))
    }
}

/// Failure body handed back to the invoker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_type: String,
    pub error_message: String,
}
