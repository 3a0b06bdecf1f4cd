//! Ingest flow: URL to bucket

use std::time::Instant;

use url::Url;

use crate::core::result::{ingest_result, IngestResponse};
use crate::core::{derive_storage_key, stage, validate_source_url};
use crate::error::Result;
use crate::protocol::s3::ObjectLocation;

use super::events::IngestEvent;
use super::TransferService;

/// Where an ingested body ended up and how big it was
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub location: ObjectLocation,
    pub size_bytes: u64,
}

impl TransferService {
    /// `file-saver`: fetch `requestUrl` and store it under its basename
    #[tracing::instrument(
        skip(self, event),
        fields(function = "file-saver", request_url = %event.request_url)
    )]
    pub async fn file_saver(&self, event: IngestEvent) -> Result<IngestResponse> {
        let outcome = self.ingest(&event.request_url).await?;
        Ok(ingest_result(event.request_url.trim(), &outcome.location))
    }

    /// Validate, fetch, stage and write one URL
    ///
    /// The URL and its key are checked before any network call. Writing the
    /// same URL twice replaces the object.
    pub(crate) async fn ingest(&self, raw_url: &str) -> Result<IngestOutcome> {
        let (url, key) = prepare_ingest(raw_url)?;
        self.ingest_prepared(&url, &key).await
    }

    pub(crate) async fn ingest_prepared(&self, url: &Url, key: &str) -> Result<IngestOutcome> {
        let start = Instant::now();

        let body = self.fetcher.fetch(url).await?;
        let payload = stage(body.reader, body.content_length).await?;
        let location = self.writer.write(&payload, key).await?;

        tracing::info!(
            url = %url,
            bucket = %location.bucket,
            key = %location.key,
            size_bytes = payload.size_bytes(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Ingest complete"
        );

        Ok(IngestOutcome {
            location,
            size_bytes: payload.size_bytes(),
        })
    }
}

/// Parse the source URL and derive its storage key
pub(crate) fn prepare_ingest(raw_url: &str) -> Result<(Url, String)> {
    let url = validate_source_url(raw_url)?;
    let key = derive_storage_key(&url)?;
    Ok((url, key))
}
