//! The import pipeline and its compensating delete.
//!
//! Ordering inside `import` is deliberate: the file id is assigned before
//! anything touches storage (the blob path is derived from it), the blob is
//! written before classification (handlers may read it back), and metadata is
//! persisted last so a commit is the final step. Every storage side effect is
//! recorded on an undo stack and reverted when a later step or the commit
//! itself fails, then the original error is returned.

use crate::media_types::MediaTypeRegistry;
use crate::undo::{UndoStack, UndoStep};
use arkivo_core::{
    blob_path, detect, reconcile_extension, FileEventKind, FileObserver, LibraryError,
    LibraryResult, Location, MediaFile, MediaResource, MediaSource,
};
use arkivo_db::{FileStore, FileTransaction};
use arkivo_storage::{Bucket, BucketRegistry, StorageError};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const DOWNLOAD_TIMEOUT_SECS: u64 = 60;

/// Outcome of a directory import: per-file best effort, so successes and
/// failures are reported side by side.
#[derive(Debug, Default)]
pub struct DirectoryImport {
    pub imported: Vec<MediaFile>,
    pub failed: Vec<FailedImport>,
}

impl DirectoryImport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug)]
pub struct FailedImport {
    pub path: PathBuf,
    pub error: LibraryError,
}

/// Entry point for bringing files under library management.
pub struct Importer {
    buckets: Arc<BucketRegistry>,
    media_types: Arc<MediaTypeRegistry>,
    store: Arc<dyn FileStore>,
    observers: Vec<Arc<dyn FileObserver>>,
}

impl std::fmt::Debug for Importer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Importer")
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Importer {
    /// Build an importer, checking up front that every media-type name the
    /// buckets reference resolves to a registered handler. A typo in bucket
    /// configuration fails here instead of on the first matching import.
    pub fn new(
        buckets: Arc<BucketRegistry>,
        media_types: Arc<MediaTypeRegistry>,
        store: Arc<dyn FileStore>,
    ) -> LibraryResult<Self> {
        for bucket in buckets.iter() {
            for name in bucket.media_types() {
                if !media_types.contains(name) {
                    return Err(LibraryError::UnknownMediaType(name.clone()));
                }
            }
        }

        Ok(Importer {
            buckets,
            media_types,
            store,
            observers: Vec::new(),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn FileObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn buckets(&self) -> &BucketRegistry {
        &self.buckets
    }

    pub fn media_types(&self) -> &MediaTypeRegistry {
        &self.media_types
    }

    pub fn store(&self) -> &Arc<dyn FileStore> {
        &self.store
    }

    /// Import a resource into the named bucket (default bucket when `None`).
    ///
    /// On success the returned file is committed: its metadata row exists and,
    /// for path resources, its blob is in the bucket. On failure neither
    /// survives.
    #[tracing::instrument(
        skip(self, resource),
        fields(name = %resource.display_name(), bucket = ?bucket_name, operation = "import")
    )]
    pub async fn import(
        &self,
        resource: MediaResource,
        bucket_name: Option<&str>,
    ) -> LibraryResult<MediaFile> {
        // Bucket resolution happens before any side effect, so an unknown
        // bucket costs nothing.
        let bucket = match bucket_name {
            Some(name) => self.buckets.get(name)?,
            None => self.buckets.get_default()?,
        };

        let mut file = MediaFile::new(resource.display_name(), bucket.name());

        let mut tx = self.store.begin().await?;
        let mut undo = UndoStack::new();

        let result = self
            .run_import_steps(&mut file, &resource, &bucket, &mut *tx, &mut undo)
            .await;

        match result {
            Ok(()) => match tx.commit().await {
                Ok(()) => {
                    tracing::info!(
                        file_id = ?file.id,
                        bucket = bucket.name(),
                        mime_type = %file.mime_type,
                        media_type = ?file.media_type,
                        "Import committed"
                    );
                    Ok(file)
                }
                Err(commit_err) => {
                    tracing::error!(error = %commit_err, "Commit failed; compensating storage writes");
                    undo.unwind().await;
                    Err(LibraryError::from(commit_err))
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, kind = err.kind(), "Import failed; compensating");
                undo.unwind().await;
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "Rollback failed during import compensation");
                }
                Err(err)
            }
        }
    }

    async fn run_import_steps(
        &self,
        file: &mut MediaFile,
        resource: &MediaResource,
        bucket: &Arc<Bucket>,
        tx: &mut dyn FileTransaction,
        undo: &mut UndoStack,
    ) -> LibraryResult<()> {
        // Identity first: the blob path is derived from the id, so it must
        // exist before any storage write.
        let id = Uuid::new_v4();
        file.id = Some(id);
        file.owner = resource.owner.clone();

        let payload = match &resource.source {
            MediaSource::Path(path) => {
                let data = self.read_validated(path, bucket).await?;
                let declared = resource.declared_extension();
                let detected = detect(&data, &declared);
                let extension = reconcile_extension(&detected.mime_type, &declared);
                file.mime_type = detected.mime_type;
                file.charset = detected.charset;
                file.location = Some(Location::file(blob_path(id, &extension)));
                Some(data)
            }
            MediaSource::Url(url) => {
                // URL references keep their bytes elsewhere: no size check,
                // no detection, no blob write.
                file.location = Some(Location::url(url.clone()));
                None
            }
        };

        self.dispatch(FileEventKind::Create, file).await?;

        if let Some(data) = payload {
            // Observers may have replaced the location, so read it back.
            if let Some(location) = file.location.clone().filter(Location::is_file) {
                undo.push(UndoStep::DeleteBlob {
                    bucket: Arc::clone(bucket),
                    location: location.clone(),
                });
                bucket.save(&location, data).await.map_err(|e| {
                    tracing::error!(
                        bucket = bucket.name(),
                        location = %location,
                        error = %e,
                        "Failed to write blob"
                    );
                    LibraryError::StorageWrite {
                        location: location.to_string(),
                        message: e.to_string(),
                    }
                })?;
            }
        }

        self.classify(file, resource, bucket).await?;
        self.dispatch(FileEventKind::Process, file).await?;

        tx.persist(file).await?;
        Ok(())
    }

    /// Walk the bucket's media types in order and hand the file to the first
    /// handler that claims it. No claim leaves the file unclassified, which
    /// is a valid outcome, not an error.
    async fn classify(
        &self,
        file: &mut MediaFile,
        resource: &MediaResource,
        bucket: &Bucket,
    ) -> LibraryResult<()> {
        for name in bucket.media_types() {
            let handler = self.media_types.get(name)?;
            if handler.supports(file, resource) {
                file.media_type = Some(name.clone());
                handler.process(file, resource, bucket).await?;
                tracing::debug!(file_id = ?file.id, media_type = %name, "File classified");
                return Ok(());
            }
        }

        tracing::debug!(file_id = ?file.id, "No media type matched; file left unclassified");
        Ok(())
    }

    async fn read_validated(&self, path: &Path, bucket: &Bucket) -> LibraryResult<Bytes> {
        // Size comes from metadata so oversized files are rejected without
        // reading them.
        let size = tokio::fs::metadata(path).await?.len();
        if !bucket.accepts_size(size) {
            return Err(LibraryError::InvalidFileSize {
                size,
                min: bucket.min_size(),
                max: bucket.max_size(),
                bucket: bucket.name().to_string(),
            });
        }

        let data = tokio::fs::read(path).await?;
        Ok(Bytes::from(data))
    }

    async fn dispatch(&self, kind: FileEventKind, file: &mut MediaFile) -> LibraryResult<()> {
        for observer in &self.observers {
            observer.on_file_event(kind, file).await?;
        }
        Ok(())
    }

    /// Remove a file from the library: metadata row and blob both go, or
    /// neither does.
    #[tracing::instrument(
        skip(self, file),
        fields(file_id = ?file.id, bucket = %file.bucket, operation = "delete")
    )]
    pub async fn delete(&self, file: &MediaFile) -> LibraryResult<()> {
        let bucket = self.buckets.get_for_file(file)?;

        let mut tx = self.store.begin().await?;
        let mut undo = UndoStack::new();

        let result = self
            .run_delete_steps(file, &bucket, &mut *tx, &mut undo)
            .await;

        match result {
            Ok(()) => match tx.commit().await {
                Ok(()) => {
                    tracing::info!(file_id = ?file.id, bucket = bucket.name(), "Delete committed");
                    Ok(())
                }
                Err(commit_err) => {
                    tracing::error!(error = %commit_err, "Commit failed; restoring deleted blob");
                    undo.unwind().await;
                    Err(LibraryError::from(commit_err))
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, kind = err.kind(), "Delete failed; compensating");
                undo.unwind().await;
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "Rollback failed during delete compensation");
                }
                Err(err)
            }
        }
    }

    async fn run_delete_steps(
        &self,
        file: &MediaFile,
        bucket: &Arc<Bucket>,
        tx: &mut dyn FileTransaction,
        undo: &mut UndoStack,
    ) -> LibraryResult<()> {
        tx.remove(file).await?;
        tx.flush().await?;

        // Observers see the file after the row is marked removed but while
        // the blob is still present.
        let mut event_file = file.clone();
        self.dispatch(FileEventKind::Delete, &mut event_file).await?;

        if let Some(location) = file.location.as_ref().filter(|l| l.is_file()) {
            // Snapshot the blob before deleting it: if the commit fails the
            // row survives, and a row without its blob would be an orphan.
            match bucket.retrieve(location).await {
                Ok(data) => undo.push(UndoStep::RestoreBlob {
                    bucket: Arc::clone(bucket),
                    location: location.clone(),
                    data,
                }),
                Err(StorageError::NotFound(_)) => {}
                Err(e) => {
                    return Err(LibraryError::StorageRead {
                        location: location.to_string(),
                        message: e.to_string(),
                    });
                }
            }

            bucket.delete(location).await.map_err(|e| {
                tracing::error!(
                    bucket = bucket.name(),
                    location = %location,
                    error = %e,
                    "Failed to delete blob"
                );
                LibraryError::StorageDelete {
                    location: location.to_string(),
                    message: e.to_string(),
                }
            })?;
        }

        Ok(())
    }

    /// Import every regular file in `dir` (one level, no recursion),
    /// optionally keeping only the given extensions. One file failing does
    /// not stop the rest.
    #[tracing::instrument(skip(self), fields(dir = %dir.display(), operation = "import_directory"))]
    pub async fn import_directory(
        &self,
        dir: &Path,
        extensions: Option<&[&str]>,
        bucket_name: Option<&str>,
    ) -> LibraryResult<DirectoryImport> {
        let mut outcome = DirectoryImport::default();
        let mut entries = tokio::fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            match entry.file_type().await {
                Ok(kind) if kind.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    outcome.failed.push(FailedImport {
                        path,
                        error: e.into(),
                    });
                    continue;
                }
            }

            if let Some(allowed) = extensions {
                let ext = path
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase())
                    .unwrap_or_default();
                if !allowed.iter().any(|candidate| candidate.eq_ignore_ascii_case(&ext)) {
                    continue;
                }
            }

            match self
                .import(MediaResource::from_path(&path), bucket_name)
                .await
            {
                Ok(file) => outcome.imported.push(file),
                Err(error) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %error,
                        "File import failed; continuing with remaining entries"
                    );
                    outcome.failed.push(FailedImport { path, error });
                }
            }
        }

        tracing::info!(
            imported = outcome.imported.len(),
            failed = outcome.failed.len(),
            "Directory import finished"
        );
        Ok(outcome)
    }

    /// Download a file over HTTP(S) and import it as a concrete file. The
    /// temp file holding the download is removed whether or not the import
    /// succeeds.
    #[tracing::instrument(skip(self), fields(url = %url, operation = "import_from_url"))]
    pub async fn import_from_url(
        &self,
        url: &str,
        name: Option<&str>,
        bucket_name: Option<&str>,
    ) -> LibraryResult<MediaFile> {
        let trimmed = url.trim();
        let parsed = reqwest::Url::parse(trimmed)
            .map_err(|_| LibraryError::InvalidResource(format!("Invalid URL format: {trimmed}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(LibraryError::InvalidResource(
                "Only HTTP and HTTPS URLs are allowed".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .build()
            .map_err(|e| LibraryError::Download(format!("Failed to create HTTP client: {e}")))?;

        tracing::info!("Downloading file from URL");
        let response = client
            .get(parsed.clone())
            .send()
            .await
            .map_err(|e| LibraryError::Download(format!("Failed to download from URL: {e}")))?;

        if !response.status().is_success() {
            return Err(LibraryError::Download(format!(
                "URL returned status code: {}",
                response.status()
            )));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| LibraryError::Download(format!("Failed to read response body: {e}")))?;

        let file_name = name
            .map(str::to_string)
            .or_else(|| {
                parsed
                    .path_segments()
                    .and_then(|mut segments| segments.next_back())
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "download".to_string());

        // NamedTempFile removes itself on drop, covering both outcomes.
        let temp = tempfile::NamedTempFile::new()?;
        tokio::fs::write(temp.path(), &data).await?;

        let resource = MediaResource::from_path(temp.path()).with_name(file_name);
        self.import(resource, bucket_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arkivo_core::BucketConfig;
    use arkivo_db::MemoryFileStore;
    use arkivo_storage::MemoryBlobStore;

    fn registry_with(media_types: Vec<String>) -> Arc<BucketRegistry> {
        let mut config = BucketConfig::named("default");
        config.media_types = media_types;
        let bucket = Arc::new(Bucket::new(&config, Arc::new(MemoryBlobStore::new())));
        Arc::new(BucketRegistry::new(vec![bucket], "default").unwrap())
    }

    #[test]
    fn test_new_rejects_unresolvable_media_types() {
        let buckets = registry_with(vec!["image".to_string(), "hologram".to_string()]);
        let err = Importer::new(
            buckets,
            Arc::new(MediaTypeRegistry::with_defaults()),
            Arc::new(MemoryFileStore::new()),
        )
        .unwrap_err();

        assert!(matches!(err, LibraryError::UnknownMediaType(name) if name == "hologram"));
    }

    #[test]
    fn test_new_accepts_registered_media_types() {
        let buckets = registry_with(vec!["image".to_string(), "other".to_string()]);
        assert!(Importer::new(
            buckets,
            Arc::new(MediaTypeRegistry::with_defaults()),
            Arc::new(MemoryFileStore::new()),
        )
        .is_ok());
    }
}
