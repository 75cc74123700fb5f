use crate::traits::{BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use arkivo_core::{BucketConfig, Location};
use bytes::Bytes;
use std::sync::Arc;

/// A named bucket: size constraints, classification order, and the blob
/// store holding its content.
///
/// Blob operations take a `Location` rather than a raw path so URL-located
/// files behave sensibly: they have no blob, so `save` is an error, `has`
/// is false, and `delete` succeeds without touching storage.
pub struct Bucket {
    name: String,
    min_size: u64,
    max_size: u64,
    media_types: Vec<String>,
    store: Arc<dyn BlobStore>,
}

impl std::fmt::Debug for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bucket")
            .field("name", &self.name)
            .field("min_size", &self.min_size)
            .field("max_size", &self.max_size)
            .field("media_types", &self.media_types)
            .field("backend", &self.store.backend_type())
            .finish_non_exhaustive()
    }
}

impl Bucket {
    pub fn new(config: &BucketConfig, store: Arc<dyn BlobStore>) -> Self {
        Bucket {
            name: config.name.clone(),
            min_size: config.min_size,
            max_size: config.max_size,
            media_types: config.media_types.clone(),
            store,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_size(&self) -> u64 {
        self.min_size
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Media-type names consulted during classification, in order.
    pub fn media_types(&self) -> &[String] {
        &self.media_types
    }

    /// Whether a file of `size` bytes fits the inclusive `[min, max]` range.
    pub fn accepts_size(&self, size: u64) -> bool {
        size >= self.min_size && size <= self.max_size
    }

    pub fn backend_type(&self) -> StorageBackend {
        self.store.backend_type()
    }

    pub async fn save(&self, location: &Location, data: Bytes) -> StorageResult<()> {
        match location {
            Location::File(path) => self.store.save(path, data).await,
            Location::Url(url) => Err(StorageError::InvalidPath(format!(
                "URL location has no blob to write: {}",
                url
            ))),
        }
    }

    pub async fn retrieve(&self, location: &Location) -> StorageResult<Bytes> {
        match location {
            Location::File(path) => self.store.retrieve(path).await,
            Location::Url(url) => Err(StorageError::NotFound(url.clone())),
        }
    }

    pub async fn has(&self, location: &Location) -> StorageResult<bool> {
        match location {
            Location::File(path) => self.store.exists(path).await,
            Location::Url(_) => Ok(false),
        }
    }

    pub async fn delete(&self, location: &Location) -> StorageResult<()> {
        match location {
            Location::File(path) => self.store.delete(path).await,
            Location::Url(_) => Ok(()),
        }
    }
}
