/*!
 * Local staging: buffer a body fully into memory
 */

use std::io;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use super::sniff::sniff_content_type;
use crate::error::{Result, TransferError};

/// Upper bound for up-front allocation from a declared length
pub const MAX_PREALLOCATION: u64 = 64 * 1024 * 1024;

const READ_CHUNK: usize = 64 * 1024;

/// A body held entirely in memory, ready to store or return
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedPayload {
    data: Bytes,
    content_type: String,
}

impl StagedPayload {
    /// Wrap a buffer and sniff its content type
    pub fn new(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let content_type = sniff_content_type(&data).to_string();
        Self { data, content_type }
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Always equal to `data().len()`
    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

/// Read `reader` to the end into a [`StagedPayload`]
///
/// `declared_len` only sizes the initial buffer. A read that fails with
/// `UnexpectedEof` ends the body like a zero-byte read does; any other I/O
/// error is a staging failure.
pub async fn stage<R>(mut reader: R, declared_len: Option<u64>) -> Result<StagedPayload>
where
    R: AsyncRead + Unpin,
{
    let capacity = declared_len.unwrap_or(0).min(MAX_PREALLOCATION) as usize;
    let mut buffer = BytesMut::with_capacity(capacity);
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    staged_bytes = buffer.len(),
                    "Reading body into staging buffer failed"
                );
                return Err(TransferError::Staging(e));
            }
        }
    }

    if let Some(expected) = declared_len {
        if expected != buffer.len() as u64 {
            tracing::debug!(
                declared = expected,
                staged = buffer.len(),
                "Body length differs from declared length"
            );
        }
    }

    Ok(StagedPayload::new(buffer.freeze()))
}
