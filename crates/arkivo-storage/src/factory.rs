#[cfg(feature = "storage-local")]
use crate::LocalBlobStore;
use crate::MemoryBlobStore;
#[cfg(feature = "storage-s3")]
use crate::S3BlobStore;
use crate::{BlobStore, Bucket, BucketRegistry, StorageBackend, StorageError, StorageResult};
use arkivo_core::Config;
use std::sync::Arc;

/// Create the blob store backing one logical bucket, based on configuration.
///
/// Local stores live under `{storage_root}/{bucket}`; S3 stores share the
/// configured physical bucket with the logical name as key prefix; memory
/// stores are per-bucket instances.
pub async fn create_store(
    config: &Config,
    bucket_name: &str,
) -> StorageResult<Arc<dyn BlobStore>> {
    match config.storage_backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config
                .s3_region
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_REGION not configured".to_string()))?;
            let endpoint = config.s3_endpoint.clone();

            let store = S3BlobStore::new(bucket, bucket_name.to_string(), region, endpoint).await?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let root = config.storage_root.clone().ok_or_else(|| {
                StorageError::ConfigError("STORAGE_ROOT not configured".to_string())
            })?;

            let store = LocalBlobStore::new(std::path::Path::new(&root).join(bucket_name)).await?;
            Ok(Arc::new(store))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        StorageBackend::Memory => Ok(Arc::new(MemoryBlobStore::new())),
    }
}

/// Build the bucket registry from configuration, one store per bucket.
pub async fn build_registry(config: &Config) -> StorageResult<BucketRegistry> {
    let mut buckets = Vec::with_capacity(config.buckets.len());
    for definition in &config.buckets {
        let store = create_store(config, &definition.name).await?;
        buckets.push(Arc::new(Bucket::new(definition, store)));
    }

    BucketRegistry::new(buckets, config.default_bucket.clone())
        .map_err(|e| StorageError::ConfigError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arkivo_core::{BucketConfig, MetadataBackend};

    fn memory_config() -> Config {
        Config {
            database_url: None,
            metadata_backend: MetadataBackend::Memory,
            storage_backend: StorageBackend::Memory,
            storage_root: None,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            default_bucket: "default".to_string(),
            buckets: vec![BucketConfig::named("default"), BucketConfig::named("images")],
        }
    }

    #[tokio::test]
    async fn test_build_registry_from_config() {
        let registry = build_registry(&memory_config()).await.unwrap();
        assert!(registry.get("default").is_ok());
        assert!(registry.get("images").is_ok());
        assert!(registry.get("missing").is_err());
        assert_eq!(
            registry.get("images").unwrap().backend_type(),
            StorageBackend::Memory
        );
    }

    #[cfg(feature = "storage-local")]
    #[tokio::test]
    async fn test_local_stores_are_bucket_scoped() {
        use arkivo_core::Location;
        use bytes::Bytes;

        let dir = tempfile::tempdir().unwrap();
        let mut config = memory_config();
        config.storage_backend = StorageBackend::Local;
        config.storage_root = Some(dir.path().to_string_lossy().into_owned());

        let registry = build_registry(&config).await.unwrap();
        let images = registry.get("images").unwrap();
        images
            .save(&Location::file("ab.bin"), Bytes::from_static(b"x"))
            .await
            .unwrap();

        assert!(dir.path().join("images").join("ab.bin").exists());
        assert!(!dir.path().join("default").join("ab.bin").exists());
    }
}
