//! In-memory object store
//!
//! Implements [`ObjectStore`] without any network access. Used by the test
//! suites and by `ferry invoke --backend memory` for local dry runs. Every put
//! is recorded so callers can assert on the exact headers that would have been
//! sent to a real backend.

use super::error::{S3Error, S3Result};
use super::operations::{ObjectBody, ObjectStore, PutObjectOutput, PutObjectRequest};
use super::types::BackendFlavor;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    bucket_exists: bool,
    objects: HashMap<String, StoredObject>,
    puts: Vec<PutObjectRequest>,
    created_locations: Vec<String>,
    failure: Option<S3Error>,
}

/// Object store backed by a `HashMap`
#[derive(Debug, Clone)]
pub struct MemoryObjectStore {
    bucket: String,
    region: String,
    flavor: BackendFlavor,
    state: Arc<RwLock<MemoryState>>,
    calls: Arc<AtomicUsize>,
}

impl MemoryObjectStore {
    /// Create a store whose bucket already exists
    pub fn new(bucket: impl Into<String>, region: impl Into<String>, flavor: BackendFlavor) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            flavor,
            state: Arc::new(RwLock::new(MemoryState {
                bucket_exists: true,
                ..Default::default()
            })),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a store whose bucket has not been created yet
    pub fn without_bucket(
        bucket: impl Into<String>,
        region: impl Into<String>,
        flavor: BackendFlavor,
    ) -> Self {
        let store = Self::new(bucket, region, flavor);
        store.write_state().bucket_exists = false;
        store
    }

    /// Seed an object
    pub fn insert(&self, key: impl Into<String>, data: impl Into<Bytes>, content_type: &str) {
        self.write_state().objects.insert(
            key.into(),
            StoredObject {
                data: data.into(),
                content_type: content_type.to_string(),
            },
        );
    }

    /// Make every following operation fail with `error`
    pub fn fail_with(&self, error: S3Error) {
        self.write_state().failure = Some(error);
    }

    /// Stored bytes for `key`
    pub fn get_data(&self, key: &str) -> Option<Bytes> {
        self.read_state().objects.get(key).map(|o| o.data.clone())
    }

    /// Number of stored objects
    pub fn object_count(&self) -> usize {
        self.read_state().objects.len()
    }

    /// Every put request received, in order
    pub fn puts(&self) -> Vec<PutObjectRequest> {
        self.read_state().puts.clone()
    }

    /// Locations passed to `create_bucket`, in order
    pub fn created_locations(&self) -> Vec<String> {
        self.read_state().created_locations.clone()
    }

    /// Total number of backend operations attempted
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin_call(&self) -> S3Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.read_state().failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn region(&self) -> &str {
        &self.region
    }

    fn flavor(&self) -> BackendFlavor {
        self.flavor
    }

    async fn put_object(&self, request: PutObjectRequest) -> S3Result<PutObjectOutput> {
        self.begin_call()?;

        let mut state = self.write_state();
        if !state.bucket_exists {
            return Err(S3Error::BucketNotFound(self.bucket.clone()));
        }

        let bytes_written = request.body.len() as u64;
        state.objects.insert(
            request.key.clone(),
            StoredObject {
                data: request.body.clone(),
                content_type: request.content_type.clone(),
            },
        );
        state.puts.push(request);

        Ok(PutObjectOutput {
            bytes_written,
        })
    }

    async fn get_object(&self, key: &str) -> S3Result<ObjectBody> {
        self.begin_call()?;

        let state = self.read_state();
        let object = state.objects.get(key).ok_or_else(|| S3Error::NotFound {
            bucket: self.bucket.clone(),
            key: key.to_string(),
        })?;

        Ok(ObjectBody {
            reader: Box::pin(Cursor::new(object.data.clone())),
            size: Some(object.data.len() as u64),
            content_type: Some(object.content_type.clone()),
        })
    }

    async fn bucket_exists(&self) -> S3Result<bool> {
        self.begin_call()?;
        Ok(self.read_state().bucket_exists)
    }

    async fn create_bucket(&self, location: &str) -> S3Result<()> {
        self.begin_call()?;

        let mut state = self.write_state();
        state.bucket_exists = true;
        state.created_locations.push(location.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_get_missing_key_is_not_found() {
        let store = MemoryObjectStore::new("files", "us-east-1", BackendFlavor::Compatible);
        let err = store.get_object("nope.bin").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_seeded_object_is_readable() {
        let store = MemoryObjectStore::new("files", "us-east-1", BackendFlavor::Aws);
        store.insert("a.txt", &b"hello"[..], "text/plain");

        let mut body = store.get_object("a.txt").await.unwrap();
        let mut out = Vec::new();
        body.reader.read_to_end(&mut out).await.unwrap();

        assert_eq!(out, b"hello");
        assert_eq!(body.size, Some(5));
        assert_eq!(store.call_count(), 1);
    }

    #[tokio::test]
    async fn test_put_requires_bucket() {
        let store = MemoryObjectStore::without_bucket("files", "us-east-1", BackendFlavor::Aws);
        assert!(!store.bucket_exists().await.unwrap());

        store.create_bucket("eu-west-1").await.unwrap();
        assert!(store.bucket_exists().await.unwrap());
        assert_eq!(store.created_locations(), vec!["eu-west-1".to_string()]);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = MemoryObjectStore::new("files", "us-east-1", BackendFlavor::Aws);
        store.fail_with(S3Error::AccessDenied("expired".to_string()));

        assert_eq!(
            store.bucket_exists().await.unwrap_err(),
            S3Error::AccessDenied("expired".to_string())
        );
    }
}
