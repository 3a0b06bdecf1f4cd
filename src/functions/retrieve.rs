//! Retrieve flow: bucket to caller

use crate::core::result::{retrieve_result, RetrieveResponse};
use crate::core::{validate_object_key, StagedPayload};
use crate::error::Result;

use super::events::RetrieveEvent;
use super::TransferService;

impl TransferService {
    /// `file-downloader`: return the object stored under `s3FileKey`
    #[tracing::instrument(
        skip(self, event),
        fields(function = "file-downloader", key = %event.s3_file_key)
    )]
    pub async fn file_downloader(&self, event: RetrieveEvent) -> Result<RetrieveResponse> {
        let payload = self.retrieve(&event.s3_file_key).await?;
        Ok(retrieve_result(&event.s3_file_key, payload))
    }

    pub(crate) async fn retrieve(&self, raw_key: &str) -> Result<StagedPayload> {
        let key = validate_object_key(raw_key)?;
        let payload = self.reader.read(key).await?;

        tracing::info!(
            bucket = %self.store.bucket(),
            key = %key,
            size_bytes = payload.size_bytes(),
            "Retrieve complete"
        );

        Ok(payload)
    }
}
