/*!
 * Response bodies returned to the invoker
 */

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::protocol::s3::ObjectLocation;

use super::staging::StagedPayload;

/// Result of the ingest flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub input_url: String,

    /// Public URL on AWS, bare key on S3-compatible backends
    pub s3_path: String,
}

/// Result of the retrieve flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveResponse {
    pub filename: String,
    pub size: u64,
    #[serde(with = "base64_bytes")]
    pub content: Bytes,
}

/// Result of a gateway call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub message: String,
    #[serde(with = "base64_bytes")]
    pub data: Bytes,
}

pub fn ingest_result(input_url: &str, location: &ObjectLocation) -> IngestResponse {
    IngestResponse {
        input_url: input_url.to_string(),
        s3_path: location.reference().to_string(),
    }
}

pub fn retrieve_result(key: &str, payload: StagedPayload) -> RetrieveResponse {
    RetrieveResponse {
        filename: key.to_string(),
        size: payload.size_bytes(),
        content: payload.into_bytes(),
    }
}

pub fn upload_result(written: u64) -> GatewayResponse {
    GatewayResponse {
        message: format!("written bytes: {}", written),
        data: Bytes::new(),
    }
}

pub fn download_result(payload: StagedPayload) -> GatewayResponse {
    GatewayResponse {
        message: format!("read bytes: {}", payload.size_bytes()),
        data: payload.into_bytes(),
    }
}

/// Serde adapter: `Bytes` as a standard base64 string
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let encoded = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        STANDARD
            .decode(encoded.as_bytes())
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::s3::BackendFlavor;
    use serde_json::json;

    #[test]
    fn test_ingest_aws_path() {
        let location = ObjectLocation::new("files", "farmer.jpg", "us-west-2", BackendFlavor::Aws);
        let response = ingest_result("https://example.com/path/to/farmer.jpg?x=1", &location);

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "inputUrl": "https://example.com/path/to/farmer.jpg?x=1",
                "s3Path": "https://files.s3.us-west-2.amazonaws.com/farmer.jpg"
            })
        );
    }

    #[test]
    fn test_retrieve_content_is_base64() {
        let response = retrieve_result("hello.txt", StagedPayload::new(&b"hello"[..]));
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["filename"], "hello.txt");
        assert_eq!(value["size"], 5);
        assert_eq!(value["content"], "aGVsbG8=");

        let back: RetrieveResponse = serde_json::from_value(value).unwrap();
        assert_eq!(back.content.as_ref(), b"hello");
    }

    #[test]
    fn test_gateway_messages() {
        let upload = upload_result(1024);
        assert_eq!(upload.message, "written bytes: 1024");
        assert!(upload.data.is_empty());
        assert_eq!(serde_json::to_value(&upload).unwrap()["data"], "");

        let download = download_result(StagedPayload::new(&b"abc"[..]));
        assert_eq!(download.message, "read bytes: 3");
        assert_eq!(serde_json::to_value(&download).unwrap()["data"], "YWJj");
    }

    #[test]
    fn test_null_data_deserialises_empty() {
        let response: GatewayResponse =
            serde_json::from_value(json!({ "message": "written bytes: 0", "data": null })).unwrap();
        assert!(response.data.is_empty());
    }
}
