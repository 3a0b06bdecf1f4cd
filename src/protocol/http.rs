/*!
 * Remote source fetching over HTTP(S)
 */

use std::fmt;
use std::io;
use std::pin::Pin;

use futures::TryStreamExt;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use url::Url;

use crate::error::{Result, TransferError};

/// An open response body; dropping it closes the connection
pub struct FetchedBody {
    pub reader: Pin<Box<dyn AsyncRead + Send>>,

    /// `Content-Length` as declared by the server, if any
    pub content_length: Option<u64>,

    /// `Content-Type` as declared by the server; informational only
    pub declared_content_type: Option<String>,
}

impl fmt::Debug for FetchedBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchedBody")
            .field("content_length", &self.content_length)
            .field("declared_content_type", &self.declared_content_type)
            .finish_non_exhaustive()
    }
}

/// Issues the GET for the ingest flow
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    client: reqwest::Client,
}

impl RemoteFetcher {
    /// Build a fetcher with its own connection pool
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("ferry/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                TransferError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    /// GET `url` and hand back the body as a reader
    ///
    /// Any non-2xx status is a `Fetch` error; the body of an error page is
    /// never handed on to be stored.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedBody> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            tracing::error!(error = %e, url = %url, "Getting URL response failed");
            TransferError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "Source returned non-success status");
            return Err(TransferError::Fetch {
                url: url.to_string(),
                reason: format!("HTTP status {}", status),
            });
        }

        let content_length = response.content_length();
        let declared_content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);

        tracing::debug!(
            url = %url,
            status = %status,
            content_length = ?content_length,
            "Source responded"
        );

        let stream = response.bytes_stream().map_err(io::Error::other);

        Ok(FetchedBody {
            reader: Box::pin(StreamReader::new(stream)),
            content_length,
            declared_content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_fetch_streams_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/files/report.txt")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("quarterly numbers")
            .create_async()
            .await;

        let fetcher = RemoteFetcher::new().unwrap();
        let url = Url::parse(&format!("{}/files/report.txt", server.url())).unwrap();
        let mut body = fetcher.fetch(&url).await.unwrap();

        let mut out = Vec::new();
        body.reader.read_to_end(&mut out).await.unwrap();

        assert_eq!(out, b"quarterly numbers");
        assert_eq!(body.content_length, Some(17));
        assert_eq!(body.declared_content_type.as_deref(), Some("text/plain"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing.png")
            .with_status(404)
            .with_body("not here")
            .create_async()
            .await;

        let fetcher = RemoteFetcher::new().unwrap();
        let url = Url::parse(&format!("{}/missing.png", server.url())).unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();

        match err {
            TransferError::Fetch { reason, .. } => assert!(reason.contains("404")),
            other => panic!("expected fetch error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_error() {
        let fetcher = RemoteFetcher::new().unwrap();
        // Port 9 (discard) on loopback is closed in test environments
        let url = Url::parse("http://127.0.0.1:9/file.bin").unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, TransferError::Fetch { .. }));
    }
}
