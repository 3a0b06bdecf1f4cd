//! S3 backend for Ferry
//!
//! This module provides AWS S3 support using the official AWS SDK for Rust.
//! It supports AWS proper as well as S3-compatible services like MinIO.
//!
//! The pipeline only ever talks to the [`ObjectStore`] trait. [`S3Client`] is
//! the production implementation; [`MemoryObjectStore`] is an in-process
//! stand-in used by tests and dry runs.
//!
//! # Using MinIO or S3-Compatible Storage
//!
//! ```ignore
//! use ferry::protocol::s3::{ObjectStore, S3Client, S3Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = S3Config {
//!         bucket: "files".to_string(),
//!         endpoint: Some("localhost:9000".to_string()),
//!         use_ssl: false,
//!         access_key: Some("minioadmin".to_string()),
//!         secret_key: Some("minioadmin".to_string()),
//!         ..Default::default()
//!     };
//!
//!     let client = S3Client::new(config).await?;
//!     if !client.bucket_exists().await? {
//!         client.create_bucket("us-east-1").await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod memory;
mod operations;
mod types;


// Re-export main types
pub use client::S3Client;
pub use config::{S3Config, DEFAULT_REGION};
pub use error::{S3Error, S3Result};
pub use memory::MemoryObjectStore;
pub use operations::{ObjectBody, ObjectStore, PutObjectOutput, PutObjectRequest};
pub use types::{BackendFlavor, CannedAcl, ObjectLocation, S3ServerSideEncryption};
