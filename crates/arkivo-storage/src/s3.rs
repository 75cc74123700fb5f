use crate::traits::{BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload, Result as ObjectResult};

/// S3 blob store
///
/// One instance serves one logical bucket: all blobs live under
/// `{prefix}/` inside a shared physical S3 bucket, so several logical
/// buckets can coexist in one S3 bucket without key collisions.
#[derive(Clone)]
pub struct S3BlobStore {
    store: AmazonS3,
    bucket: String,
    prefix: String,
}

impl S3BlobStore {
    /// Create a new S3BlobStore instance
    ///
    /// # Arguments
    /// * `bucket` - physical S3 bucket name
    /// * `prefix` - key prefix for this logical bucket
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        prefix: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        // Build AmazonS3 object store from environment and explicit settings.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
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

        Ok(S3BlobStore {
            store,
            bucket,
            prefix,
        })
    }

    fn object_path(&self, blob_path: &str) -> StorageResult<Path> {
        if blob_path.is_empty() || blob_path.contains("..") || blob_path.starts_with('/') {
            return Err(StorageError::InvalidPath(
                "Blob path contains invalid characters".to_string(),
            ));
        }
        let key = if self.prefix.is_empty() {
            blob_path.to_string()
        } else {
            format!("{}/{}", self.prefix, blob_path)
        };
        Ok(Path::from(key))
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn save(&self, blob_path: &str, data: Bytes) -> StorageResult<()> {
        let location = self.object_path(blob_path)?;
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(data)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %location,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 blob write failed"
            );
            StorageError::WriteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %location,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 blob write successful"
        );

        Ok(())
    }

    async fn retrieve(&self, blob_path: &str) -> StorageResult<Bytes> {
        let location = self.object_path(blob_path)?;
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(blob_path.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %location,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 blob read failed"
                );
                StorageError::ReadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %location,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 blob read successful"
        );

        Ok(bytes)
    }

    async fn delete(&self, blob_path: &str) -> StorageResult<()> {
        let location = self.object_path(blob_path)?;
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.delete(&location).await;

        match result {
            Ok(_) | Err(ObjectStoreError::NotFound { .. }) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %location,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 blob delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %location,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 blob delete successful"
        );

        Ok(())
    }

    async fn exists(&self, blob_path: &str) -> StorageResult<bool> {
        let location = self.object_path(blob_path)?;
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_object_path_applies_prefix() {
        let store = S3BlobStore::new(
            "arkivo-media".to_string(),
            "images".to_string(),
            "us-east-1".to_string(),
            None,
        )
        .await
        .unwrap();

        let path = store.object_path("ab12.png").unwrap();
        assert_eq!(path.to_string(), "images/ab12.png");
    }

    #[tokio::test]
    async fn test_object_path_rejects_traversal() {
        let store = S3BlobStore::new(
            "arkivo-media".to_string(),
            String::new(),
            "us-east-1".to_string(),
            None,
        )
        .await
        .unwrap();

        assert!(matches!(
            store.object_path("../escape"),
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            store.object_path("/absolute"),
            Err(StorageError::InvalidPath(_))
        ));
    }
}
