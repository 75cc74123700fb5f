//! Error types module
//!
//! This module provides the error vocabulary shared by all Arkivo crates.
//! Library operations return `LibraryError`; the storage and metadata crates
//! define their own lower-level enums and convert at the call site so the
//! failing location and the failure reason both survive into the message.

use std::io;

/// Convenience alias for results of library operations.
pub type LibraryResult<T> = Result<T, LibraryError>;

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("No media type handler registered for: {0}")]
    UnknownMediaType(String),

    #[error("File size {size} bytes outside range [{min}, {max}] accepted by bucket '{bucket}'")]
    InvalidFileSize {
        size: u64,
        min: u64,
        max: u64,
        bucket: String,
    },

    #[error("Storage write failed at '{location}': {message}")]
    StorageWrite { location: String, message: String },

    #[error("Storage read failed at '{location}': {message}")]
    StorageRead { location: String, message: String },

    #[error("Storage delete failed at '{location}': {message}")]
    StorageDelete { location: String, message: String },

    #[error("Metadata transaction failed: {0}")]
    MetadataTransaction(String),

    #[error("Invalid media resource: {0}")]
    InvalidResource(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl LibraryError {
    /// Short variant name, used as a structured log field when an operation
    /// is compensated or retried.
    pub fn kind(&self) -> &'static str {
        match self {
            LibraryError::BucketNotFound(_) => "BucketNotFound",
            LibraryError::UnknownMediaType(_) => "UnknownMediaType",
            LibraryError::InvalidFileSize { .. } => "InvalidFileSize",
            LibraryError::StorageWrite { .. } => "StorageWrite",
            LibraryError::StorageRead { .. } => "StorageRead",
            LibraryError::StorageDelete { .. } => "StorageDelete",
            LibraryError::MetadataTransaction(_) => "MetadataTransaction",
            LibraryError::InvalidResource(_) => "InvalidResource",
            LibraryError::Download(_) => "Download",
            LibraryError::Io(_) => "Io",
        }
    }

    /// True for failures worth retrying without changing the request
    /// (infrastructure hiccups rather than caller mistakes).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LibraryError::StorageWrite { .. }
                | LibraryError::StorageRead { .. }
                | LibraryError::StorageDelete { .. }
                | LibraryError::MetadataTransaction(_)
                | LibraryError::Download(_)
                | LibraryError::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_file_size_message_names_bounds() {
        let err = LibraryError::InvalidFileSize {
            size: 999,
            min: 1,
            max: 100,
            bucket: "images".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("999"));
        assert!(msg.contains("[1, 100]"));
        assert!(msg.contains("images"));
        assert_eq!(err.kind(), "InvalidFileSize");
        assert!(!err.is_transient());
    }

    #[test]
    fn test_bucket_not_found_is_not_transient() {
        let err = LibraryError::BucketNotFound("missing".to_string());
        assert_eq!(err.kind(), "BucketNotFound");
        assert!(!err.is_transient());
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_storage_write_is_transient() {
        let err = LibraryError::StorageWrite {
            location: "ab12.png".to_string(),
            message: "disk full".to_string(),
        };
        assert!(err.is_transient());
        assert!(err.to_string().contains("ab12.png"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_io_error_converts() {
        let err: LibraryError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind(), "Io");
        assert!(err.is_transient());
    }
}
