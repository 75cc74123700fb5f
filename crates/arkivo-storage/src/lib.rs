//! Arkivo Storage Library
//!
//! This crate provides blob storage for the media library: the `BlobStore`
//! trait with local-filesystem, S3 and in-memory implementations, plus the
//! `Bucket` and `BucketRegistry` types layered on top.
//!
//! # Blob path format
//!
//! Blob paths are bucket-relative and derived from the file id (see
//! `arkivo_core::blob_path`), so they are flat hex names with an optional
//! extension. Paths must not contain `..` or a leading `/`; backends reject
//! anything that would escape their root.

pub mod bucket;
pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
pub mod registry;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use arkivo_core::StorageBackend;
pub use bucket::Bucket;
pub use factory::{build_registry, create_store};
#[cfg(feature = "storage-local")]
pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;
pub use registry::BucketRegistry;
#[cfg(feature = "storage-s3")]
pub use s3::S3BlobStore;
pub use traits::{BlobStore, StorageError, StorageResult};
