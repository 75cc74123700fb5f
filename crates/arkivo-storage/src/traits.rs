//! Blob storage abstraction trait
//!
//! This module defines the BlobStore trait that all storage backends must
//! implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Invalid blob path: {0}")]
    InvalidPath(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Blob storage abstraction trait
///
/// All storage backends (local filesystem, S3, in-memory) must implement
/// this trait. The bucket layer works against it so import and delete flows
/// never couple to a specific backend.
///
/// **Path format:** Paths are bucket-relative (see the crate root
/// documentation). `delete` of a missing blob succeeds; compensation paths
/// rely on that idempotency.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write a blob at the given path, replacing any existing content.
    async fn save(&self, path: &str, data: Bytes) -> StorageResult<()>;

    /// Read a blob's full content.
    async fn retrieve(&self, path: &str) -> StorageResult<Bytes>;

    /// Delete a blob. Deleting a missing blob is not an error.
    async fn delete(&self, path: &str) -> StorageResult<()>;

    /// Check whether a blob exists.
    async fn exists(&self, path: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
