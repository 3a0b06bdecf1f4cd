//! Type definitions for S3 operations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::S3Error;

/// Which kind of S3 service a client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendFlavor {
    /// Amazon S3 proper (no custom endpoint)
    Aws,

    /// MinIO or any other S3-compatible gateway reached through a custom endpoint
    Compatible,
}

impl BackendFlavor {
    /// Whether stored objects can be addressed with a virtual-hosted AWS URL
    pub fn is_aws(&self) -> bool {
        matches!(self, BackendFlavor::Aws)
    }
}

impl fmt::Display for BackendFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendFlavor::Aws => write!(f, "aws"),
            BackendFlavor::Compatible => write!(f, "s3-compatible"),
        }
    }
}

/// S3 server-side encryption options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum S3ServerSideEncryption {
    /// AES256 encryption
    Aes256,

    /// No encryption
    #[default]
    None,
}

impl S3ServerSideEncryption {
    /// Convert to AWS SDK server-side encryption
    pub fn to_aws(&self) -> Option<aws_sdk_s3::types::ServerSideEncryption> {
        match self {
            S3ServerSideEncryption::Aes256 => Some(aws_sdk_s3::types::ServerSideEncryption::Aes256),
            S3ServerSideEncryption::None => None,
        }
    }
}

/// Canned ACLs accepted on put
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CannedAcl {
    #[default]
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
    BucketOwnerRead,
    BucketOwnerFullControl,
}

impl CannedAcl {
    /// Convert to AWS SDK canned ACL
    pub fn to_aws(&self) -> aws_sdk_s3::types::ObjectCannedAcl {
        use aws_sdk_s3::types::ObjectCannedAcl;
        match self {
            CannedAcl::Private => ObjectCannedAcl::Private,
            CannedAcl::PublicRead => ObjectCannedAcl::PublicRead,
            CannedAcl::PublicReadWrite => ObjectCannedAcl::PublicReadWrite,
            CannedAcl::AuthenticatedRead => ObjectCannedAcl::AuthenticatedRead,
            CannedAcl::BucketOwnerRead => ObjectCannedAcl::BucketOwnerRead,
            CannedAcl::BucketOwnerFullControl => ObjectCannedAcl::BucketOwnerFullControl,
        }
    }
}

impl fmt::Display for CannedAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CannedAcl::Private => write!(f, "private"),
            CannedAcl::PublicRead => write!(f, "public-read"),
            CannedAcl::PublicReadWrite => write!(f, "public-read-write"),
            CannedAcl::AuthenticatedRead => write!(f, "authenticated-read"),
            CannedAcl::BucketOwnerRead => write!(f, "bucket-owner-read"),
            CannedAcl::BucketOwnerFullControl => write!(f, "bucket-owner-full-control"),
        }
    }
}

impl FromStr for CannedAcl {
    type Err = S3Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "private" => Ok(CannedAcl::Private),
            "public-read" => Ok(CannedAcl::PublicRead),
            "public-read-write" => Ok(CannedAcl::PublicReadWrite),
            "authenticated-read" => Ok(CannedAcl::AuthenticatedRead),
            "bucket-owner-read" => Ok(CannedAcl::BucketOwnerRead),
            "bucket-owner-full-control" => Ok(CannedAcl::BucketOwnerFullControl),
            other => Err(S3Error::InvalidConfig(format!("Unknown canned ACL: {}", other))),
        }
    }
}

/// Where a stored object ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectLocation {
    /// Bucket name
    pub bucket: String,

    /// Object key within the bucket
    pub key: String,

    /// Fully qualified URL, only known for AWS-hosted buckets
    pub public_url: Option<String>,
}

impl ObjectLocation {
    /// Build a location, deriving the virtual-hosted URL for AWS buckets
    ///
    /// The key is percent-encoded in the URL; `key` itself stays as stored.
    pub fn new(bucket: &str, key: &str, region: &str, flavor: BackendFlavor) -> Self {
        let public_url = flavor.is_aws().then(|| {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                bucket,
                region,
                urlencoding::encode(key)
            )
        });

        Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
            public_url,
        }
    }

    /// The reference handed back to callers: the URL when known, else the bare key
    pub fn reference(&self) -> &str {
        self.public_url.as_deref().unwrap_or(&self.key)
    }
}
