/*!
 * Protocol layer for Ferry
 *
 * Two ends of every transfer:
 * - HTTP(S) sources, fetched with `reqwest`
 * - S3 and S3-compatible object storage (MinIO), via the AWS SDK
 */

pub mod http;
pub mod s3;

pub use http::{FetchedBody, RemoteFetcher};
