use super::MediaTypeHandler;
use arkivo_core::{MediaFile, MediaResource};

/// Catch-all handler. Buckets put it last in their media-type list when every
/// file should end up classified.
pub struct OtherHandler;

impl MediaTypeHandler for OtherHandler {
    fn name(&self) -> &'static str {
        "other"
    }

    fn supports(&self, _file: &MediaFile, _resource: &MediaResource) -> bool {
        true
    }
}
