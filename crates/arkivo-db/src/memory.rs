//! In-memory metadata store.
//!
//! Backs tests and embedded setups where no database is available. Writes are
//! staged inside the transaction and applied to the shared map only on commit,
//! which gives the same rollback behavior the Postgres backend gets from real
//! transactions.

use crate::store::{FileStore, FileTransaction, MetadataError, MetadataResult};
use arkivo_core::MediaFile;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

type FileMap = Arc<Mutex<HashMap<Uuid, MediaFile>>>;

#[derive(Clone, Default)]
pub struct MemoryFileStore {
    files: FileMap,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed files. Test helper.
    pub fn file_count(&self) -> usize {
        self.files.lock().expect("file map poisoned").len()
    }

    /// Whether a committed row exists for the id. Test helper.
    pub fn has_file(&self, id: Uuid) -> bool {
        self.files
            .lock()
            .expect("file map poisoned")
            .contains_key(&id)
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn begin(&self) -> MetadataResult<Box<dyn FileTransaction>> {
        Ok(Box::new(MemoryFileTransaction {
            files: Arc::clone(&self.files),
            staged: Vec::new(),
            completed: false,
        }))
    }

    async fn find(&self, id: Uuid) -> MetadataResult<Option<MediaFile>> {
        let files = self.files.lock().expect("file map poisoned");
        Ok(files.get(&id).cloned())
    }

    async fn list_bucket(&self, bucket: &str) -> MetadataResult<Vec<MediaFile>> {
        let files = self.files.lock().expect("file map poisoned");
        let mut matches: Vec<MediaFile> = files
            .values()
            .filter(|f| f.bucket == bucket)
            .cloned()
            .collect();
        // Newest first, matching the Postgres backend's ordering.
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }
}

enum StagedOp {
    Persist(MediaFile),
    Remove(Uuid),
}

pub struct MemoryFileTransaction {
    files: FileMap,
    staged: Vec<StagedOp>,
    completed: bool,
}

impl MemoryFileTransaction {
    fn ensure_open(&self) -> MetadataResult<()> {
        if self.completed {
            return Err(MetadataError::Completed);
        }
        Ok(())
    }

    fn staged_contains(&self, id: Uuid) -> bool {
        self.staged.iter().any(|op| match op {
            StagedOp::Persist(file) => file.id == Some(id),
            StagedOp::Remove(removed) => *removed == id,
        })
    }
}

#[async_trait]
impl FileTransaction for MemoryFileTransaction {
    async fn persist(&mut self, file: &mut MediaFile) -> MetadataResult<()> {
        self.ensure_open()?;
        if file.id.is_none() {
            return Err(MetadataError::MissingId);
        }

        let now = Utc::now();
        if file.created_at.is_none() {
            file.created_at = Some(now);
        }
        file.updated_at = Some(now);

        self.staged.push(StagedOp::Persist(file.clone()));
        Ok(())
    }

    async fn remove(&mut self, file: &MediaFile) -> MetadataResult<()> {
        self.ensure_open()?;
        let id = file.id.ok_or(MetadataError::MissingId)?;

        let committed = self
            .files
            .lock()
            .expect("file map poisoned")
            .contains_key(&id);
        if !committed && !self.staged_contains(id) {
            return Err(MetadataError::NotFound(id));
        }

        self.staged.push(StagedOp::Remove(id));
        Ok(())
    }

    async fn flush(&mut self) -> MetadataResult<()> {
        // Staged ops only become visible at commit; there is nothing to push
        // to a backend here.
        self.ensure_open()
    }

    async fn commit(mut self: Box<Self>) -> MetadataResult<()> {
        self.ensure_open()?;
        let mut files = self.files.lock().expect("file map poisoned");
        for op in self.staged.drain(..) {
            match op {
                StagedOp::Persist(file) => {
                    if let Some(id) = file.id {
                        files.insert(id, file);
                    }
                }
                StagedOp::Remove(id) => {
                    files.remove(&id);
                }
            }
        }
        self.completed = true;
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> MetadataResult<()> {
        self.ensure_open()?;
        self.staged.clear();
        self.completed = true;
        Ok(())
    }
}

impl Drop for MemoryFileTransaction {
    fn drop(&mut self) {
        if !self.completed && !self.staged.is_empty() {
            tracing::warn!(
                staged = self.staged.len(),
                "Metadata transaction dropped without commit or rollback; discarding staged writes"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_file(bucket: &str) -> MediaFile {
        let mut file = MediaFile::new("photo.png", bucket);
        file.id = Some(Uuid::new_v4());
        file.mime_type = "image/png".to_string();
        file.charset = "binary".to_string();
        file
    }

    #[tokio::test]
    async fn test_commit_makes_file_visible() {
        let store = MemoryFileStore::new();
        let mut file = sample_file("default");
        let id = file.id.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.persist(&mut file).await.unwrap();
        assert!(file.created_at.is_some());
        assert!(!store.has_file(id));

        tx.commit().await.unwrap();
        assert!(store.has_file(id));

        let found = store.find(id).await.unwrap().unwrap();
        assert_eq!(found.name, "photo.png");
        assert_eq!(found.mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_rollback_discards_staged_writes() {
        let store = MemoryFileStore::new();
        let mut file = sample_file("default");
        let id = file.id.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.persist(&mut file).await.unwrap();
        tx.rollback().await.unwrap();

        assert!(!store.has_file(id));
        assert_eq!(store.file_count(), 0);
    }

    #[tokio::test]
    async fn test_remove_committed_file() {
        let store = MemoryFileStore::new();
        let mut file = sample_file("default");
        let id = file.id.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.persist(&mut file).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.remove(&file).await.unwrap();
        tx.flush().await.unwrap();
        tx.commit().await.unwrap();

        assert!(!store.has_file(id));
    }

    #[tokio::test]
    async fn test_remove_unknown_file_fails() {
        let store = MemoryFileStore::new();
        let file = sample_file("default");

        let mut tx = store.begin().await.unwrap();
        let err = tx.remove(&file).await.unwrap_err();
        assert!(matches!(err, MetadataError::NotFound(_)));
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_persist_without_id_fails() {
        let store = MemoryFileStore::new();
        let mut file = MediaFile::new("orphan.bin", "default");

        let mut tx = store.begin().await.unwrap();
        let err = tx.persist(&mut file).await.unwrap_err();
        assert!(matches!(err, MetadataError::MissingId));
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_list_bucket_filters_and_orders() {
        let store = MemoryFileStore::new();

        let mut tx = store.begin().await.unwrap();
        let mut first = sample_file("images");
        tx.persist(&mut first).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let mut second = sample_file("images");
        second.name = "newer.png".to_string();
        tx.persist(&mut second).await.unwrap();
        let mut other = sample_file("documents");
        tx.persist(&mut other).await.unwrap();
        tx.commit().await.unwrap();

        let listed = store.list_bucket("images").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "newer.png");
    }

    #[tokio::test]
    async fn test_remove_sees_writes_staged_in_same_transaction() {
        let store = MemoryFileStore::new();
        let mut file = sample_file("default");
        let id = file.id.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.persist(&mut file).await.unwrap();
        tx.remove(&file).await.unwrap();
        tx.commit().await.unwrap();

        assert!(!store.has_file(id));
        assert_eq!(store.file_count(), 0);
    }
}
