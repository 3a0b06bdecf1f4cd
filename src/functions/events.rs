//! Invocation events

use serde::{Deserialize, Serialize};

/// `file-saver` input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestEvent {
    #[serde(alias = "url", alias = "inputUrl")]
    pub request_url: String,
}

/// `file-downloader` input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveEvent {
    pub s3_file_key: String,
}

/// `gateway` input
///
/// `data` is the source URL for `upload` and the object key for `download`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    pub function_type: String,
    #[serde(default)]
    pub data: String,
}
