use crate::keys::validate_key;
use crate::traits::{Storage, StorageError, StorageResult, UploadDestination};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};
use std::time::Duration;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Public URL for an object
    ///
    /// AWS uses virtual-hosted style `https://{bucket}.s3.{region}.amazonaws.com/{key}`;
    /// custom endpoints use path style `{endpoint}/{bucket}/{key}`.
    fn generate_url(&self, key: &str) -> String {
        match self.endpoint_url {
            Some(ref endpoint) => {
                format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key)
            }
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            ),
        }
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn generate_upload_slot(
        &self,
        storage_key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> StorageResult<UploadDestination> {
        validate_key(storage_key)?;
        let location = Path::from(storage_key.to_string());

        let url_result: ObjectResult<_> = self.store.signed_url(Method::PUT, &location, ttl).await;
        let url = url_result
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    "S3 presign failed"
                );
                StorageError::BackendError(e.to_string())
            })?
            .to_string();

        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| StorageError::ConfigError(format!("Invalid upload slot TTL: {}", e)))?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %storage_key,
            ttl_secs = ttl.num_seconds(),
            "S3 upload slot generated"
        );

        Ok(UploadDestination::PresignedPut {
            url,
            storage_key: storage_key.to_string(),
            content_type: content_type.to_string(),
            expires_at: Utc::now() + ttl,
        })
    }

    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        validate_key(storage_key)?;
        let size = data.len() as u64;
        let location = Path::from(storage_key.to_string());
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self
            .store
            .put(&location, PutPayload::from(Bytes::from(data)))
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(self.generate_url(storage_key))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        validate_key(storage_key)?;
        let location = Path::from(storage_key.to_string());

        let result: ObjectResult<_> = self.store.get(&location).await;
        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(storage_key.to_string()),
            other => StorageError::DownloadFailed(other.to_string()),
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        validate_key(storage_key)?;
        let start = std::time::Instant::now();
        let location = Path::from(storage_key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        validate_key(storage_key)?;
        let location = Path::from(storage_key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn public_url(&self, storage_key: &str) -> String {
        self.generate_url(storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
