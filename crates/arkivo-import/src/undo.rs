//! Compensation steps for the import and delete pipelines.
//!
//! Each pipeline records the storage side effect it is about to perform, then
//! unwinds the recorded steps in reverse when a later step fails. Unwinding
//! is best effort: a failing step is logged and the remaining steps still
//! run, so compensation never masks the error that triggered it.

use arkivo_core::Location;
use arkivo_storage::Bucket;
use bytes::Bytes;
use std::sync::Arc;

pub(crate) enum UndoStep {
    /// Remove a blob written during import.
    DeleteBlob {
        bucket: Arc<Bucket>,
        location: Location,
    },
    /// Put back a blob removed during delete.
    RestoreBlob {
        bucket: Arc<Bucket>,
        location: Location,
        data: Bytes,
    },
}

pub(crate) struct UndoStack {
    steps: Vec<UndoStep>,
}

impl UndoStack {
    pub fn new() -> Self {
        UndoStack { steps: Vec::new() }
    }

    pub fn push(&mut self, step: UndoStep) {
        self.steps.push(step);
    }

    /// Execute recorded steps in reverse order. Failures are logged, never
    /// propagated.
    pub async fn unwind(mut self) {
        while let Some(step) = self.steps.pop() {
            match step {
                UndoStep::DeleteBlob { bucket, location } => {
                    // The step is recorded before the write, so the blob may
                    // not be there at all.
                    match bucket.has(&location).await {
                        Ok(false) => continue,
                        Ok(true) => {}
                        Err(e) => {
                            tracing::warn!(
                                bucket = bucket.name(),
                                location = %location,
                                error = %e,
                                "Could not check blob existence during compensation; attempting delete anyway"
                            );
                        }
                    }
                    if let Err(e) = bucket.delete(&location).await {
                        tracing::warn!(
                            bucket = bucket.name(),
                            location = %location,
                            error = %e,
                            "Failed to delete blob during compensation"
                        );
                    }
                }
                UndoStep::RestoreBlob {
                    bucket,
                    location,
                    data,
                } => {
                    if let Err(e) = bucket.save(&location, data).await {
                        tracing::warn!(
                            bucket = bucket.name(),
                            location = %location,
                            error = %e,
                            "Failed to restore blob during compensation"
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arkivo_core::BucketConfig;
    use arkivo_storage::MemoryBlobStore;

    fn memory_bucket() -> (Arc<Bucket>, MemoryBlobStore) {
        let store = MemoryBlobStore::new();
        let bucket = Arc::new(Bucket::new(
            &BucketConfig::named("default"),
            Arc::new(store.clone()),
        ));
        (bucket, store)
    }

    #[tokio::test]
    async fn test_unwind_deletes_written_blob() {
        let (bucket, store) = memory_bucket();
        let location = Location::file("ab12.png");
        bucket
            .save(&location, Bytes::from_static(b"data"))
            .await
            .unwrap();

        let mut undo = UndoStack::new();
        undo.push(UndoStep::DeleteBlob {
            bucket: Arc::clone(&bucket),
            location: location.clone(),
        });
        undo.unwind().await;

        assert!(!store.contains("ab12.png"));
    }

    #[tokio::test]
    async fn test_unwind_skips_blob_that_was_never_written() {
        let (bucket, store) = memory_bucket();

        let mut undo = UndoStack::new();
        undo.push(UndoStep::DeleteBlob {
            bucket,
            location: Location::file("ab12.png"),
        });
        undo.unwind().await;

        assert_eq!(store.blob_count(), 0);
    }

    #[tokio::test]
    async fn test_unwind_restores_deleted_blob() {
        let (bucket, store) = memory_bucket();
        let location = Location::file("cd34.pdf");

        let mut undo = UndoStack::new();
        undo.push(UndoStep::RestoreBlob {
            bucket,
            location,
            data: Bytes::from_static(b"original"),
        });
        undo.unwind().await;

        assert!(store.contains("cd34.pdf"));
    }

    #[tokio::test]
    async fn test_unwind_runs_steps_in_reverse() {
        let (bucket, store) = memory_bucket();
        let first = Location::file("first.bin");
        let second = Location::file("second.bin");
        bucket
            .save(&second, Bytes::from_static(b"2"))
            .await
            .unwrap();

        let mut undo = UndoStack::new();
        undo.push(UndoStep::RestoreBlob {
            bucket: Arc::clone(&bucket),
            location: first,
            data: Bytes::from_static(b"1"),
        });
        undo.push(UndoStep::DeleteBlob {
            bucket,
            location: second,
        });
        undo.unwind().await;

        // Both steps ran: the later push (delete) and then the earlier one.
        assert!(!store.contains("second.bin"));
        assert!(store.contains("first.bin"));
    }
}
