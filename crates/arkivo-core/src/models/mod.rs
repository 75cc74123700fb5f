//! Data models for the media library
//!
//! This module contains the domain structures: managed files, their storage
//! locations, and the source resources imports start from.

mod file;
mod location;
mod resource;

// Re-export all models for convenient imports
pub use file::MediaFile;
pub use location::{blob_path, Location};
pub use resource::{MediaResource, MediaSource};

#[cfg(feature = "sqlx")]
pub use file::MediaFileRow;
