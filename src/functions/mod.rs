/*!
 * Function handlers
 *
 * `TransferService` holds everything an invocation needs and is built once
 * per process. The handlers live in their own modules:
 * - `file-saver` (ingest): fetch a URL, store it in the bucket
 * - `file-downloader` (retrieve): read an object back
 * - `gateway`: route `upload` / `download` to the two flows
 */

pub mod events;
pub mod gateway;
pub mod ingest;
pub mod retrieve;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;

use crate::config::ServiceConfig;
use crate::core::{ObjectReader, ObjectWriter, WritePolicy};
use crate::error::{Result, TransferError};
use crate::protocol::http::RemoteFetcher;
use crate::protocol::s3::{ObjectStore, S3Client};

pub use events::{GatewayEvent, IngestEvent, RetrieveEvent};
pub use gateway::GatewayFunction;
pub use ingest::IngestOutcome;

/// Invocable functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionName {
    FileSaver,
    FileDownloader,
    Gateway,
}

impl FromStr for FunctionName {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "file-saver" => Ok(FunctionName::FileSaver),
            "file-downloader" => Ok(FunctionName::FileDownloader),
            "gateway" => Ok(FunctionName::Gateway),
            other => Err(TransferError::UnknownFunction(other.to_string())),
        }
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionName::FileSaver => write!(f, "file-saver"),
            FunctionName::FileDownloader => write!(f, "file-downloader"),
            FunctionName::Gateway => write!(f, "gateway"),
        }
    }
}

/// Shared state for all invocations
///
/// Cloning is cheap; the store sits behind an `Arc`.
#[derive(Clone)]
pub struct TransferService {
    store: Arc<dyn ObjectStore>,
    fetcher: RemoteFetcher,
    writer: ObjectWriter,
    reader: ObjectReader,
    bucket_location: String,
}

impl TransferService {
    /// Wire a service around an existing store
    pub fn new(
        store: Arc<dyn ObjectStore>,
        fetcher: RemoteFetcher,
        policy: WritePolicy,
        bucket_location: impl Into<String>,
    ) -> Self {
        Self {
            writer: ObjectWriter::new(Arc::clone(&store), policy),
            reader: ObjectReader::new(Arc::clone(&store)),
            store,
            fetcher,
            bucket_location: bucket_location.into(),
        }
    }

    /// Build the S3 client and HTTP fetcher described by `config`
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let client = S3Client::new(config.storage.clone())
            .await
            .map_err(|e| TransferError::Configuration(e.to_string()))?;

        let flavor = config.storage.flavor();
        let policy = WritePolicy::for_flavor(flavor, config.acl);

        tracing::info!(
            backend = %config.backend,
            flavor = %flavor,
            bucket = %config.storage.bucket,
            region = %config.storage.effective_region(),
            "Transfer service ready"
        );

        Ok(Self::new(
            Arc::new(client),
            RemoteFetcher::new()?,
            policy,
            config.storage.effective_bucket_location(),
        ))
    }

    /// JSON in, JSON out
    pub async fn invoke(&self, function: FunctionName, event: Value) -> Result<Value> {
        let response = match function {
            FunctionName::FileSaver => {
                serde_json::to_value(self.file_saver(serde_json::from_value(event)?).await?)
            }
            FunctionName::FileDownloader => {
                serde_json::to_value(self.file_downloader(serde_json::from_value(event)?).await?)
            }
            FunctionName::Gateway => {
                serde_json::to_value(self.gateway(serde_json::from_value(event)?).await?)
            }
        };

        response.map_err(|e| TransferError::InvalidRequest(format!("Failed to encode response: {}", e)))
    }
}

impl fmt::Debug for TransferService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferService")
            .field("bucket", &self.store.bucket())
            .field("flavor", &self.store.flavor())
            .field("policy", self.writer.policy())
            .field("bucket_location", &self.bucket_location)
            .finish()
    }
}
