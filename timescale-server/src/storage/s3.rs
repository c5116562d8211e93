//! S3 backend

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::presigning::PresigningConfig;

use super::{ObjectStore, StorageError};

#[derive(Clone)]
pub struct S3Store {
    client: Client,
}

impl S3Store {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Client from the default AWS credential chain. `endpoint` points the
    /// client at an S3-compatible service (path-style addressing).
    pub async fn from_env(endpoint: Option<&str>) -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(url) = endpoint {
            builder = builder.endpoint_url(url).force_path_style(true);
        }
        tracing::info!(endpoint = ?endpoint, "S3 client initialized");
        Self::new(Client::from_conf(builder.build()))
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body.into())
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(bucket, key, error = %e, "S3 upload failed");
                StorageError::Upload {
                    key: key.to_string(),
                    message: e.to_string(),
                }
            })?;
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        ttl: Duration,
    ) -> Result<String, StorageError> {
        let presign_err = |message: String| StorageError::Presign {
            key: key.to_string(),
            message,
        };
        let presigning = PresigningConfig::expires_in(ttl).map_err(|e| presign_err(e.to_string()))?;
        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| {
                tracing::error!(bucket, key, error = %e, "Failed to generate presigned URL");
                presign_err(e.to_string())
            })?;
        Ok(presigned.uri().to_string())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}
