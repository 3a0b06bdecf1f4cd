//! S3 client implementation

use super::config::S3Config;
use super::error::{S3Error, S3Result};
use super::operations::{ObjectBody, ObjectStore, PutObjectOutput, PutObjectRequest};
use super::types::BackendFlavor;
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client as AwsS3Client;
use std::time::Instant;

/// Client for AWS S3 and S3-compatible storage
#[derive(Clone)]
pub struct S3Client {
    /// AWS S3 client
    client: AwsS3Client,

    /// Client configuration
    config: S3Config,
}

impl S3Client {
    /// Create a new S3 client with the given configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ferry::protocol::s3::{S3Client, S3Config};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let config = S3Config::new("mvp-file-storage".to_string());
    ///     let client = S3Client::new(config).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: S3Config) -> S3Result<Self> {
        config.validate()?;

        let client = Self::build_aws_client(&config).await;

        tracing::debug!(
            bucket = %config.bucket,
            region = %config.effective_region(),
            flavor = %config.flavor(),
            "S3 client initialised"
        );

        Ok(Self { client, config })
    }

    /// Build the AWS SDK S3 client from configuration
    async fn build_aws_client(config: &S3Config) -> AwsS3Client {
        let mut aws_config_loader = aws_config::defaults(BehaviorVersion::latest());

        let region_provider = if let Some(region_str) = &config.region {
            RegionProviderChain::first_try(Region::new(region_str.clone()))
        } else {
            RegionProviderChain::default_provider().or_else(Region::new(super::DEFAULT_REGION))
        };
        aws_config_loader = aws_config_loader.region(region_provider);

        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            let credentials = Credentials::new(
                access_key,
                secret_key,
                config.session_token.clone(),
                None,
                "ferry-static",
            );
            aws_config_loader = aws_config_loader.credentials_provider(credentials);
        }

        let aws_config = aws_config_loader.load().await;

        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&aws_config);

        if let Some(endpoint) = config.endpoint_url() {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint);
        }

        // Gateways such as MinIO do not serve virtual-hosted buckets
        if config.force_path_style || config.is_custom_endpoint() {
            s3_config_builder = s3_config_builder.force_path_style(true);
        }

        AwsS3Client::from_conf(s3_config_builder.build())
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    fn bucket(&self) -> &str {
        &self.config.bucket
    }

    fn region(&self) -> &str {
        self.config.effective_region()
    }

    fn flavor(&self) -> BackendFlavor {
        self.config.flavor()
    }

    async fn put_object(&self, request: PutObjectRequest) -> S3Result<PutObjectOutput> {
        let start = Instant::now();
        let size = request.content_length;
        let content_length = i64::try_from(size).map_err(|_| {
            S3Error::InvalidConfig(format!("Object too large for a single put: {} bytes", size))
        })?;

        let mut builder = self
            .client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&request.key)
            .body(ByteStream::from(request.body))
            .content_length(content_length)
            .content_type(&request.content_type);

        if let Some(disposition) = &request.content_disposition {
            builder = builder.content_disposition(disposition);
        }

        if let Some(acl) = request.acl {
            builder = builder.acl(acl.to_aws());
        }

        if let Some(sse) = request.server_side_encryption.to_aws() {
            builder = builder.server_side_encryption(sse);
        }

        builder.send().await.map_err(|e| {
            let err = S3Error::from(e);
            tracing::error!(
                error = %err,
                bucket = %self.config.bucket,
                key = %request.key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 put failed"
            );
            err
        })?;

        tracing::info!(
            bucket = %self.config.bucket,
            key = %request.key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 put successful"
        );

        Ok(PutObjectOutput {
            bytes_written: size,
        })
    }

    async fn get_object(&self, key: &str) -> S3Result<ObjectBody> {
        let response = self
            .client
            .get_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let missing = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false)
                    || e.raw_response()
                        .map(|r| r.status().as_u16() == 404)
                        .unwrap_or(false);

                if missing {
                    S3Error::NotFound {
                        bucket: self.config.bucket.clone(),
                        key: key.to_string(),
                    }
                } else {
                    S3Error::from(e)
                }
            })?;

        let size = response
            .content_length()
            .and_then(|len| u64::try_from(len).ok());
        let content_type = response.content_type().map(str::to_string);

        Ok(ObjectBody {
            reader: Box::pin(response.body.into_async_read()),
            size,
            content_type,
        })
    }

    async fn bucket_exists(&self) -> S3Result<bool> {
        match self
            .client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                let missing = e
                    .as_service_error()
                    .map(|se| se.is_not_found())
                    .unwrap_or(false)
                    || e.raw_response()
                        .map(|r| r.status().as_u16() == 404)
                        .unwrap_or(false);

                if missing {
                    Ok(false)
                } else {
                    Err(S3Error::from(e))
                }
            }
        }
    }

    async fn create_bucket(&self, location: &str) -> S3Result<()> {
        let mut builder = self.client.create_bucket().bucket(&self.config.bucket);

        // us-east-1 is the implicit location and must not be sent as a constraint
        if !location.is_empty() && location != super::DEFAULT_REGION {
            builder = builder.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(location))
                    .build(),
            );
        }

        match builder.send().await {
            Ok(_) => {
                tracing::info!(
                    bucket = %self.config.bucket,
                    location = %location,
                    "Bucket created"
                );
                Ok(())
            }
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_bucket_already_owned_by_you())
                    .unwrap_or(false) =>
            {
                Ok(())
            }
            Err(e) => Err(S3Error::from(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let config = S3Config::new("test-bucket".to_string());
        let result = S3Client::new(config).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_client_with_invalid_bucket() {
        let config = S3Config::new("".to_string());
        let result = S3Client::new(config).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_compatible_client_reports_flavor() {
        let mut config = S3Config::new("files".to_string());
        config.endpoint = Some("localhost:9000".to_string());
        config.use_ssl = false;
        config.access_key = Some("minioadmin".to_string());
        config.secret_key = Some("minioadmin".to_string());

        let client = S3Client::new(config).await.unwrap();
        assert_eq!(client.bucket(), "files");
        assert_eq!(client.flavor(), BackendFlavor::Compatible);
        assert_eq!(client.region(), super::super::DEFAULT_REGION);
    }
}
