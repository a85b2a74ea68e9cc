use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region, SharedCredentialsProvider};
use aws_sdk_s3::error::DisplayErrorContext;
use bytes::Bytes;
use tracing::info;

use super::{ResumeStorage, StorageError, browser_url};
use crate::config::StorageConfig;

/// MinIO / S3 object store with path-style addressing
#[derive(Debug, Clone)]
pub struct S3ResumeStorage {
    client: Client,
    bucket: String,
    console_url: String,
}

fn backend_error<E: std::error::Error>(err: E) -> StorageError {
    StorageError::Backend(DisplayErrorContext(&err).to_string())
}

impl S3ResumeStorage {
    pub async fn new(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "leads-static",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(config.endpoint_url())
            .credentials_provider(SharedCredentialsProvider::new(credentials))
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            console_url: config.console_url.clone(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Create the bucket unless it already exists
    pub async fn ensure_bucket(&self) -> Result<(), StorageError> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                info!(bucket = %self.bucket, "Bucket already exists");
                Ok(())
            }
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => {
                self.client
                    .create_bucket()
                    .bucket(&self.bucket)
                    .send()
                    .await
                    .map_err(backend_error)?;
                info!(bucket = %self.bucket, "Created bucket");
                Ok(())
            }
            Err(e) => Err(backend_error(e)),
        }
    }
}

#[async_trait]
impl ResumeStorage for S3ResumeStorage {
    async fn put(&self, path: &str, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_type(content_type)
            .content_length(data.len() as i64)
            .body(data.into())
            .send()
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Bytes, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StorageError::NotFound(path.to_string())
                } else {
                    backend_error(e)
                }
            })?;

        let body = output.body.collect().await.map_err(backend_error)?;
        Ok(body.into_bytes())
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    fn browser_url(&self, path: &str) -> String {
        browser_url(&self.console_url, &self.bucket, path)
    }
}
