use crate::traits::{BlobStore, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem blob store
#[derive(Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a new LocalBlobStore rooted at the given directory
    /// (e.g., "/var/lib/arkivo/blobs/images"). The directory is created if
    /// it does not exist.
    pub async fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(LocalBlobStore { root })
    }

    /// Convert a blob path to a filesystem path with security validation
    ///
    /// This function validates that the blob path doesn't contain traversal
    /// sequences that could escape the storage root.
    fn blob_to_fs_path(&self, blob_path: &str) -> StorageResult<PathBuf> {
        if blob_path.is_empty() || blob_path.contains("..") || blob_path.starts_with('/') {
            return Err(StorageError::InvalidPath(
                "Blob path contains invalid characters".to_string(),
            ));
        }

        let path = self.root.join(blob_path);

        let root_canonical = self.root.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize storage root: {}", e))
        })?;

        if let Ok(canonical) = path.canonicalize() {
            if canonical.strip_prefix(&root_canonical).is_err() {
                return Err(StorageError::InvalidPath(
                    "Blob path resolves outside storage root".to_string(),
                ));
            }
        }

        Ok(path)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn save(&self, blob_path: &str, data: Bytes) -> StorageResult<()> {
        let path = self.blob_to_fs_path(blob_path)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            blob = %blob_path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local blob write successful"
        );

        Ok(())
    }

    async fn retrieve(&self, blob_path: &str) -> StorageResult<Bytes> {
        let path = self.blob_to_fs_path(blob_path)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(blob_path.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            blob = %blob_path,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local blob read successful"
        );

        Ok(Bytes::from(data))
    }

    async fn delete(&self, blob_path: &str) -> StorageResult<()> {
        let path = self.blob_to_fs_path(blob_path)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            blob = %blob_path,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local blob delete successful"
        );

        Ok(())
    }

    async fn exists(&self, blob_path: &str) -> StorageResult<bool> {
        let path = self.blob_to_fs_path(blob_path)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_save_and_retrieve() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();

        let data = Bytes::from_static(b"test data");
        store.save("ab12cd.txt", data.clone()).await.unwrap();

        let retrieved = store.retrieve("ab12cd.txt").await.unwrap();
        assert_eq!(data, retrieved);
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();

        let result = store.retrieve("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));

        let result = store.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));

        let result = store.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));

        let result = store.save("", Bytes::from_static(b"x")).await;
        assert!(matches!(result, Err(StorageError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_ok() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();

        assert!(store.delete("missing.txt").await.is_ok());
    }

    #[tokio::test]
    async fn test_retrieve_nonexistent_is_not_found() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();

        let result = store.retrieve("missing.txt").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_exists() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();

        store
            .save("present.bin", Bytes::from_static(b"x"))
            .await
            .unwrap();

        assert!(store.exists("present.bin").await.unwrap());
        assert!(!store.exists("absent.bin").await.unwrap());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();

        store
            .save("blob.bin", Bytes::from_static(b"first"))
            .await
            .unwrap();
        store
            .save("blob.bin", Bytes::from_static(b"second"))
            .await
            .unwrap();

        let retrieved = store.retrieve("blob.bin").await.unwrap();
        assert_eq!(retrieved, Bytes::from_static(b"second"));
    }

    #[tokio::test]
    async fn test_save_creates_nested_dirs() {
        let dir = tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();

        store
            .save("previews/64x64/ab12.png", Bytes::from_static(b"px"))
            .await
            .unwrap();
        assert!(store.exists("previews/64x64/ab12.png").await.unwrap());
    }
}
