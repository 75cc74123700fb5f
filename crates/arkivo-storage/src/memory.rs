use crate::traits::{BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory blob store
///
/// Backs the `memory` storage backend and most of the test suite. Contents
/// are shared across clones, so a handle kept by a test observes writes made
/// through the bucket layer.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn blob_count(&self) -> usize {
        self.blobs.read().expect("blob map poisoned").len()
    }

    /// Synchronous existence check for assertions.
    pub fn contains(&self, path: &str) -> bool {
        self.blobs
            .read()
            .expect("blob map poisoned")
            .contains_key(path)
    }

    /// Seed a blob directly, bypassing validation.
    pub fn insert(&self, path: impl Into<String>, data: impl Into<Bytes>) {
        self.blobs
            .write()
            .expect("blob map poisoned")
            .insert(path.into(), data.into());
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn save(&self, path: &str, data: Bytes) -> StorageResult<()> {
        if path.is_empty() || path.contains("..") || path.starts_with('/') {
            return Err(StorageError::InvalidPath(
                "Blob path contains invalid characters".to_string(),
            ));
        }
        self.blobs
            .write()
            .expect("blob map poisoned")
            .insert(path.to_string(), data);
        Ok(())
    }

    async fn retrieve(&self, path: &str) -> StorageResult<Bytes> {
        self.blobs
            .read()
            .expect("blob map poisoned")
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        self.blobs.write().expect("blob map poisoned").remove(path);
        Ok(())
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self
            .blobs
            .read()
            .expect("blob map poisoned")
            .contains_key(path))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
