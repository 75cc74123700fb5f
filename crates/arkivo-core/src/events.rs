//! Lifecycle events and the observer seam
//!
//! Observers hook into the import pipeline at fixed points: `Create` fires
//! after detection but before the blob write (mutations still influence
//! storage and classification), `Process` after classification, `Delete`
//! after the metadata row is removed but before the blob goes away. An
//! observer error aborts the surrounding operation and triggers its
//! compensation.

use async_trait::async_trait;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::error::LibraryError;
use crate::models::MediaFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEventKind {
    Create,
    Process,
    Delete,
}

impl Display for FileEventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FileEventKind::Create => write!(f, "create"),
            FileEventKind::Process => write!(f, "process"),
            FileEventKind::Delete => write!(f, "delete"),
        }
    }
}

/// Receives lifecycle events for managed files.
#[async_trait]
pub trait FileObserver: Send + Sync {
    async fn on_file_event(
        &self,
        kind: FileEventKind,
        file: &mut MediaFile,
    ) -> Result<(), LibraryError>;
}

/// No-op implementation for when no observers are configured
pub struct NoopObserver;

#[async_trait]
impl FileObserver for NoopObserver {
    async fn on_file_event(
        &self,
        _kind: FileEventKind,
        _file: &mut MediaFile,
    ) -> Result<(), LibraryError> {
        Ok(())
    }
}
