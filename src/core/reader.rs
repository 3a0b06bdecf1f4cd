/*!
 * Object reader: open and stage stored objects
 */

use std::sync::Arc;

use crate::error::{Result, TransferError};
use crate::protocol::s3::{ObjectBody, ObjectStore, S3Error};

use super::staging::{stage, StagedPayload};

/// Reads objects from the shared store
#[derive(Clone)]
pub struct ObjectReader {
    store: Arc<dyn ObjectStore>,
}

impl ObjectReader {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Open `key` for reading
    ///
    /// An absent key is `NotFound`; every other backend failure is `Backend`.
    pub async fn open(&self, key: &str) -> Result<ObjectBody> {
        self.store.get_object(key).await.map_err(|e| match e {
            S3Error::NotFound { bucket, key } => {
                tracing::warn!(bucket = %bucket, key = %key, "Object not found");
                TransferError::NotFound { bucket, key }
            }
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.store.bucket(),
                    key = %key,
                    "Failed to get object"
                );
                TransferError::Backend(other)
            }
        })
    }

    /// Open `key` and stage the whole object
    pub async fn read(&self, key: &str) -> Result<StagedPayload> {
        let body = self.open(key).await?;
        let payload = stage(body.reader, body.size).await?;

        tracing::debug!(
            bucket = %self.store.bucket(),
            key = %key,
            size_bytes = payload.size_bytes(),
            "Object staged"
        );

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::s3::{BackendFlavor, MemoryObjectStore};

    fn reader_with(store: &MemoryObjectStore) -> ObjectReader {
        ObjectReader::new(Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn test_read_existing_object() {
        let store = MemoryObjectStore::new("files", "us-east-1", BackendFlavor::Compatible);
        store.insert("farmer.jpg", &b"\xFF\xD8\xFF\xE0jpegdata"[..], "image/jpeg");

        let payload = reader_with(&store).read("farmer.jpg").await.unwrap();
        assert_eq!(payload.data().as_ref(), b"\xFF\xD8\xFF\xE0jpegdata");
        assert_eq!(payload.size_bytes(), 12);
        assert_eq!(payload.content_type(), "image/jpeg");
    }

    #[tokio::test]
    async fn test_missing_key_is_not_found() {
        let store = MemoryObjectStore::new("files", "us-east-1", BackendFlavor::Aws);
        let err = reader_with(&store).read("ghost.png").await.unwrap_err();

        match err {
            TransferError::NotFound { bucket, key } => {
                assert_eq!(bucket, "files");
                assert_eq!(key, "ghost.png");
            }
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_backend_error() {
        let store = MemoryObjectStore::new("files", "us-east-1", BackendFlavor::Aws);
        store.fail_with(S3Error::Network("connection refused".to_string()));

        let err = reader_with(&store).open("a.txt").await.unwrap_err();
        assert!(matches!(err, TransferError::Backend(S3Error::Network(_))));
    }
}
