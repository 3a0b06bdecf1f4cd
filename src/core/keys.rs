/*!
 * Storage key derivation
 */

use url::Url;

use crate::error::{Result, TransferError};

/// Derive the object key for a source URL: the basename of its path
///
/// Trailing slashes are ignored, as are the query and fragment. The segment is
/// percent-decoded before the basename is taken, so an encoded `/` splits it;
/// a segment that is not valid UTF-8 once decoded is used as it appears in the
/// URL.
pub fn derive_storage_key(url: &Url) -> Result<String> {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .ok_or_else(|| no_basename(url))?;

    let decoded = match urlencoding::decode(segment) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => segment.to_string(),
    };

    let key = decoded
        .split('/')
        .filter(|s| !s.is_empty())
        .last()
        .ok_or_else(|| no_basename(url))?;

    if key.trim().is_empty() || key == "." || key == ".." {
        return Err(no_basename(url));
    }

    Ok(key.to_string())
}

fn no_basename(url: &Url) -> TransferError {
    TransferError::InvalidRequest(format!(
        "request URL {} has no file name to store under",
        url
    ))
}
