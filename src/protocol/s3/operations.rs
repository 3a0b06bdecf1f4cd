//! Object store capability used by the transfer pipeline

use super::error::S3Result;
use super::types::{BackendFlavor, CannedAcl, S3ServerSideEncryption};
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::pin::Pin;
use tokio::io::AsyncRead;

/// A single-shot put, fully described up front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectRequest {
    pub key: String,
    pub body: Bytes,
    pub content_length: u64,
    pub content_type: String,
    pub content_disposition: Option<String>,
    pub acl: Option<CannedAcl>,
    pub server_side_encryption: S3ServerSideEncryption,
}

/// What the backend reported after a put
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectOutput {
    pub bytes_written: u64,
}

/// An open object body; dropping it releases the underlying connection
pub struct ObjectBody {
    pub reader: Pin<Box<dyn AsyncRead + Send>>,

    /// Size declared by the backend, if any
    pub size: Option<u64>,

    /// Content type stored with the object
    pub content_type: Option<String>,
}

impl fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBody")
            .field("size", &self.size)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Trait defining the backend operations the functions rely on
///
/// Implementations are built once per process and shared read-only across
/// invocations, hence `Send + Sync` and `&self` everywhere.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket every operation targets
    fn bucket(&self) -> &str;

    /// Signing region
    fn region(&self) -> &str;

    /// AWS proper or S3-compatible
    fn flavor(&self) -> BackendFlavor;

    /// Store an object in one request
    async fn put_object(&self, request: PutObjectRequest) -> S3Result<PutObjectOutput>;

    /// Open an object for reading; absent keys yield `S3Error::NotFound`
    async fn get_object(&self, key: &str) -> S3Result<ObjectBody>;

    /// Whether the configured bucket exists
    async fn bucket_exists(&self) -> S3Result<bool>;

    /// Create the configured bucket in the given location
    async fn create_bucket(&self, location: &str) -> S3Result<()>;
}
