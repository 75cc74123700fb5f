use arkivo_core::{LibraryError, MediaFile};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub type MetadataResult<T> = Result<T, MetadataError>;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[cfg(feature = "postgres")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[cfg(feature = "postgres")]
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Metadata backend error: {0}")]
    Backend(String),

    #[error("File not found: {0}")]
    NotFound(Uuid),

    #[error("File has no id assigned")]
    MissingId,

    #[error("Transaction already completed")]
    Completed,
}

impl From<MetadataError> for LibraryError {
    fn from(err: MetadataError) -> Self {
        LibraryError::MetadataTransaction(err.to_string())
    }
}

/// Metadata store for media files.
///
/// Reads run against committed state; every mutation happens inside a
/// [`FileTransaction`] obtained from [`FileStore::begin`].
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn begin(&self) -> MetadataResult<Box<dyn FileTransaction>>;

    async fn find(&self, id: Uuid) -> MetadataResult<Option<MediaFile>>;

    async fn list_bucket(&self, bucket: &str) -> MetadataResult<Vec<MediaFile>>;
}

/// A unit of metadata work, committed or rolled back as a whole.
///
/// `persist` stamps `created_at` (first write only) and `updated_at` on the
/// passed file, so the caller's copy matches what was stored. Transactions are
/// single-use: `commit` and `rollback` consume them, and any call after
/// completion returns [`MetadataError::Completed`].
#[async_trait]
pub trait FileTransaction: Send {
    /// Insert the file, or update it if a row with the same id exists.
    async fn persist(&mut self, file: &mut MediaFile) -> MetadataResult<()>;

    /// Delete the file's row. [`MetadataError::NotFound`] if no row matches.
    async fn remove(&mut self, file: &MediaFile) -> MetadataResult<()>;

    /// Push any buffered writes to the backend without committing, so later
    /// steps observe them inside the transaction.
    async fn flush(&mut self) -> MetadataResult<()>;

    async fn commit(self: Box<Self>) -> MetadataResult<()>;

    async fn rollback(self: Box<Self>) -> MetadataResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let id = Uuid::nil();
        assert_eq!(
            MetadataError::NotFound(id).to_string(),
            format!("File not found: {id}")
        );
        assert_eq!(
            MetadataError::Completed.to_string(),
            "Transaction already completed"
        );
    }

    #[test]
    fn test_converts_into_library_error() {
        let err: LibraryError = MetadataError::MissingId.into();
        assert!(matches!(err, LibraryError::MetadataTransaction(_)));
    }
}
