//! Gateway: one entry point for upload and download

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::core::result::{download_result, upload_result, GatewayResponse};
use crate::error::{Result, TransferError};

use super::events::GatewayEvent;
use super::ingest::prepare_ingest;
use super::TransferService;

/// Operations the gateway routes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayFunction {
    Upload,
    Download,
}

impl FromStr for GatewayFunction {
    type Err = TransferError;

    /// Exact, case-sensitive match
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "upload" => Ok(GatewayFunction::Upload),
            "download" => Ok(GatewayFunction::Download),
            other => Err(TransferError::UnknownFunction(other.to_string())),
        }
    }
}

impl fmt::Display for GatewayFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayFunction::Upload => write!(f, "upload"),
            GatewayFunction::Download => write!(f, "download"),
        }
    }
}

impl TransferService {
    /// `gateway`: route to ingest or retrieve by `functionType`
    ///
    /// An unknown function type fails before the backend is contacted.
    #[tracing::instrument(
        skip(self, event),
        fields(function = "gateway", function_type = %event.function_type, data = %event.data)
    )]
    pub async fn gateway(&self, event: GatewayEvent) -> Result<GatewayResponse> {
        let function: GatewayFunction = event.function_type.parse()?;

        match function {
            GatewayFunction::Upload => {
                let (url, key) = prepare_ingest(&event.data)?;
                self.ensure_bucket().await?;
                let outcome = self.ingest_prepared(&url, &key).await?;
                Ok(upload_result(outcome.size_bytes))
            }
            GatewayFunction::Download => {
                let payload = self.retrieve(&event.data).await?;
                Ok(download_result(payload))
            }
        }
    }

    /// Create the bucket at the configured location if it is missing
    ///
    /// Runs on every upload; the check costs one `HeadBucket` round trip.
    pub async fn ensure_bucket(&self) -> Result<()> {
        let start = Instant::now();
        let bucket = self.store.bucket();

        let exists = self.store.bucket_exists().await.map_err(|e| {
            tracing::error!(error = %e, bucket = %bucket, "Bucket existence check failed");
            TransferError::Backend(e)
        })?;

        tracing::debug!(
            bucket = %bucket,
            exists,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Checked bucket"
        );

        if exists {
            return Ok(());
        }

        self.store
            .create_bucket(&self.bucket_location)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    location = %self.bucket_location,
                    "Bucket creation failed"
                );
                TransferError::Backend(e)
            })?;

        tracing::info!(bucket = %bucket, location = %self.bucket_location, "Created bucket");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_function_type() {
        assert_eq!("upload".parse::<GatewayFunction>().unwrap(), GatewayFunction::Upload);
        assert_eq!(
            "download".parse::<GatewayFunction>().unwrap(),
            GatewayFunction::Download
        );
    }

    #[test]
    fn test_parse_is_exact() {
        for raw in ["Upload", " upload", "transcode", ""] {
            let err = raw.parse::<GatewayFunction>().unwrap_err();
            assert!(matches!(err, TransferError::UnknownFunction(ref name) if name == raw));
        }
    }

    #[test]
    fn test_display_round_trips() {
        for f in [GatewayFunction::Upload, GatewayFunction::Download] {
            assert_eq!(f.to_string().parse::<GatewayFunction>().unwrap(), f);
        }
    }
}
