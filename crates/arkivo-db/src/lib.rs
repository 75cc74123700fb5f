//! Metadata persistence for the media library.
//!
//! File rows live in a single `media_files` table (or its in-memory
//! equivalent). All writes go through a [`FileTransaction`] so that the import
//! pipeline can roll metadata back when a later step fails; reads go through
//! the owning [`FileStore`].
//!
//! Two backends are provided: [`PgFileStore`] (Postgres via sqlx, behind the
//! `postgres` feature) and [`MemoryFileStore`] for tests and embedded use.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod store;

pub use memory::MemoryFileStore;
#[cfg(feature = "postgres")]
pub use postgres::PgFileStore;
pub use store::{FileStore, FileTransaction, MetadataError, MetadataResult};
