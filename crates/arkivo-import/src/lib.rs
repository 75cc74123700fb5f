//! The import pipeline: takes a [`MediaResource`], writes its content into a
//! bucket's blob store, classifies it against the bucket's media types, and
//! persists the resulting metadata row, compensating storage writes whenever
//! a later step fails.
//!
//! [`Importer`] is the entry point; [`setup::build_importer`] assembles one
//! from environment configuration.
//!
//! [`MediaResource`]: arkivo_core::MediaResource

pub mod importer;
pub mod media_types;
pub mod setup;
pub mod telemetry;
mod undo;

pub use importer::{DirectoryImport, FailedImport, Importer};
pub use media_types::{MediaTypeHandler, MediaTypeRegistry};
pub use setup::build_importer;
