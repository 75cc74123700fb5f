use super::MediaTypeHandler;
use arkivo_core::{MediaFile, MediaResource};

/// Handler for audio files.
pub struct AudioHandler;

impl MediaTypeHandler for AudioHandler {
    fn name(&self) -> &'static str {
        "audio"
    }

    fn supports(&self, file: &MediaFile, _resource: &MediaResource) -> bool {
        file.mime_type.starts_with("audio/")
    }
}
