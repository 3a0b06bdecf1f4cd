//! Configuration types for S3 client

use super::error::{S3Error, S3Result};
use super::types::BackendFlavor;
use serde::{Deserialize, Serialize};

/// Region used when none is configured, matching what MinIO assumes
pub const DEFAULT_REGION: &str = "us-east-1";

/// S3 client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,

    /// AWS region (e.g., "us-east-1")
    #[serde(default)]
    pub region: Option<String>,

    /// Custom endpoint (for S3-compatible services like MinIO); may omit the scheme
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Access key ID (optional - uses credential chain if not provided)
    #[serde(default)]
    pub access_key: Option<String>,

    /// Secret access key (optional - uses credential chain if not provided)
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Session token (for temporary credentials)
    #[serde(default)]
    pub session_token: Option<String>,

    /// Use TLS when the endpoint carries no scheme
    #[serde(default = "default_true")]
    pub use_ssl: bool,

    /// Path-style addressing (required for some S3-compatible services)
    #[serde(default)]
    pub force_path_style: bool,

    /// Location constraint used when the bucket has to be created
    #[serde(default)]
    pub bucket_location: Option<String>,
}

fn default_true() -> bool {
    true
}

impl S3Config {
    /// Create a new S3 config with required parameters
    pub fn new(bucket: String) -> Self {
        Self {
            bucket,
            region: None,
            endpoint: None,
            access_key: None,
            secret_key: None,
            session_token: None,
            use_ssl: true,
            force_path_style: false,
            bucket_location: None,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> S3Result<()> {
        if self.bucket.is_empty() {
            return Err(S3Error::InvalidBucketName(
                "Bucket name cannot be empty".to_string(),
            ));
        }

        if !is_valid_bucket_name(&self.bucket) {
            return Err(S3Error::InvalidBucketName(format!(
                "Invalid bucket name: {}. Bucket names must be 3-63 characters, \
                 lowercase letters, numbers, hyphens, and periods only",
                self.bucket
            )));
        }

        if matches!(self.region.as_deref(), Some(r) if r.trim().is_empty()) {
            return Err(S3Error::InvalidConfig("Region cannot be empty".to_string()));
        }

        if matches!(self.endpoint.as_deref(), Some(e) if e.trim().is_empty()) {
            return Err(S3Error::InvalidConfig(
                "Endpoint cannot be empty".to_string(),
            ));
        }

        // Validate credentials consistency
        if self.access_key.is_some() != self.secret_key.is_some() {
            return Err(S3Error::InvalidConfig(
                "Both access_key and secret_key must be provided together".to_string(),
            ));
        }

        Ok(())
    }

    /// Check if using custom endpoint (S3-compatible service)
    pub fn is_custom_endpoint(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Check if using explicit credentials
    pub fn has_explicit_credentials(&self) -> bool {
        self.access_key.is_some() && self.secret_key.is_some()
    }

    /// AWS proper, or a generic S3-compatible gateway
    pub fn flavor(&self) -> BackendFlavor {
        if self.is_custom_endpoint() {
            BackendFlavor::Compatible
        } else {
            BackendFlavor::Aws
        }
    }

    /// Effective signing region
    pub fn effective_region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Effective location constraint for bucket creation
    pub fn effective_bucket_location(&self) -> &str {
        self.bucket_location
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.effective_region())
    }

    /// Endpoint as a full URL; bare `host:port` endpoints get a scheme from `use_ssl`
    pub fn endpoint_url(&self) -> Option<String> {
        self.endpoint.as_ref().map(|endpoint| {
            if endpoint.contains("://") {
                endpoint.trim_end_matches('/').to_string()
            } else {
                let scheme = if self.use_ssl { "https" } else { "http" };
                format!("{}://{}", scheme, endpoint.trim_end_matches('/'))
            }
        })
    }
}

impl Default for S3Config {
    fn default() -> Self {
        Self::new("".to_string())
    }
}

/// Validate S3 bucket name according to AWS rules
fn is_valid_bucket_name(name: &str) -> bool {
    let len = name.len();

    // Length check: 3-63 characters
    if !(3..=63).contains(&len) {
        return false;
    }

    let bytes = name.as_bytes();
    let first = bytes[0];
    let last = bytes[len - 1];
    if !first.is_ascii_lowercase() && !first.is_ascii_digit() {
        return false;
    }
    if !last.is_ascii_lowercase() && !last.is_ascii_digit() {
        return false;
    }

    // Only lowercase letters, numbers, hyphens, and periods
    if !bytes
        .iter()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == b'-' || *c == b'.')
    {
        return false;
    }

    if name.contains("..") {
        return false;
    }

    // Cannot be formatted as IP address
    if name.split('.').count() == 4 && name.split('.').all(|s| s.parse::<u8>().is_ok()) {
        return false;
    }

    // Reserved prefix and suffix
    !(name.starts_with("xn--") || name.ends_with("-s3alias"))
}
