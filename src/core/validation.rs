/*!
 * Request validation for transfer events
 */

use url::Url;

use crate::error::{Result, TransferError};

/// Parse and check a source URL before anything touches the network
///
/// Accepts absolute `http`/`https` URLs with a non-empty host. Surrounding
/// whitespace is ignored.
pub fn validate_source_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TransferError::InvalidRequest(
            "request URL is empty".to_string(),
        ));
    }

    let url = Url::parse(trimmed).map_err(|e| {
        TransferError::InvalidRequest(format!("invalid request URL {:?}: {}", trimmed, e))
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(TransferError::InvalidRequest(format!(
                "unsupported URL scheme {:?}, expected http or https",
                other
            )))
        }
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(TransferError::InvalidRequest(format!(
            "request URL {:?} has no host",
            trimmed
        )));
    }

    Ok(url)
}

/// Check an object key supplied by the caller
pub fn validate_object_key(raw: &str) -> Result<&str> {
    if raw.trim().is_empty() {
        return Err(TransferError::InvalidRequest(
            "object key is empty".to_string(),
        ));
    }

    Ok(raw)
}
