/*!
 * Object writer: one put per staged payload
 */

use std::sync::Arc;
use std::time::Instant;

use crate::error::{Result, TransferError};
use crate::protocol::s3::{
    BackendFlavor, CannedAcl, ObjectLocation, ObjectStore, PutObjectRequest,
    S3ServerSideEncryption,
};

use super::staging::StagedPayload;

pub const ATTACHMENT: &str = "attachment";

/// Headers applied to every stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritePolicy {
    /// Canned ACL, `None` to let the bucket policy decide
    pub acl: Option<CannedAcl>,
    pub server_side_encryption: S3ServerSideEncryption,
    pub content_disposition: Option<String>,
}

impl WritePolicy {
    /// AES256 at rest on AWS; S3-compatible gateways get no SSE header
    pub fn for_flavor(flavor: BackendFlavor, acl: Option<CannedAcl>) -> Self {
        let server_side_encryption = match flavor {
            BackendFlavor::Aws => S3ServerSideEncryption::Aes256,
            BackendFlavor::Compatible => S3ServerSideEncryption::None,
        };

        Self {
            acl,
            server_side_encryption,
            content_disposition: Some(ATTACHMENT.to_string()),
        }
    }
}

/// Writes staged payloads to the shared store
#[derive(Clone)]
pub struct ObjectWriter {
    store: Arc<dyn ObjectStore>,
    policy: WritePolicy,
}

impl ObjectWriter {
    pub fn new(store: Arc<dyn ObjectStore>, policy: WritePolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &WritePolicy {
        &self.policy
    }

    /// Store `payload` under `key`, replacing any existing object
    ///
    /// Nothing is cleaned up on failure: a single put never leaves a partial
    /// object behind.
    pub async fn write(&self, payload: &StagedPayload, key: &str) -> Result<ObjectLocation> {
        let start = Instant::now();
        let request = PutObjectRequest {
            key: key.to_string(),
            body: payload.data().clone(),
            content_length: payload.size_bytes(),
            content_type: payload.content_type().to_string(),
            content_disposition: self.policy.content_disposition.clone(),
            acl: self.policy.acl,
            server_side_encryption: self.policy.server_side_encryption.clone(),
        };

        let output = self.store.put_object(request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.store.bucket(),
                key = %key,
                "Failed to upload object"
            );
            TransferError::Write(e)
        })?;

        tracing::info!(
            bucket = %self.store.bucket(),
            key = %key,
            size_bytes = output.bytes_written,
            content_type = %payload.content_type(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Object stored"
        );

        Ok(ObjectLocation::new(
            self.store.bucket(),
            key,
            self.store.region(),
            self.store.flavor(),
        ))
    }
}
