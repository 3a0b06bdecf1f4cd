/*!
 * Ferry - file transfer functions for S3 and MinIO
 *
 * Serverless-style handlers that move one file per invocation:
 * - file-saver: fetch an HTTP(S) URL and store the body in a bucket
 * - file-downloader: read an object back as base64 content
 * - gateway: route `upload` / `download` to the two flows
 *
 * Works against AWS S3 and S3-compatible endpoints such as MinIO.
 */

pub mod config;
pub mod core;
pub mod error;
pub mod functions;
pub mod logging;
pub mod protocol;

// Re-export commonly used types
pub use config::{BackendKind, LogFormat, LogLevel, LoggingConfig, ServiceConfig};
pub use error::{ErrorCategory, ErrorResponse, Result, TransferError};
pub use functions::{FunctionName, GatewayFunction, TransferService};
pub use protocol::s3::{BackendFlavor, MemoryObjectStore, ObjectStore, S3Client};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
    }
}
