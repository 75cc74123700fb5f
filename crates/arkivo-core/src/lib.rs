//! Arkivo Core Library
//!
//! This crate provides the domain model of the media library: managed files,
//! their locations and source resources, content-type detection, lifecycle
//! events, configuration, and the shared error vocabulary.

pub mod config;
pub mod constants;
pub mod content_type;
pub mod error;
pub mod events;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BucketConfig, Config, MetadataBackend};
pub use content_type::{detect, reconcile_extension, DetectedContent};
pub use error::{LibraryError, LibraryResult};
pub use events::{FileEventKind, FileObserver, NoopObserver};
pub use models::{blob_path, Location, MediaFile, MediaResource, MediaSource};
pub use storage_types::StorageBackend;

#[cfg(feature = "sqlx")]
pub use models::MediaFileRow;
