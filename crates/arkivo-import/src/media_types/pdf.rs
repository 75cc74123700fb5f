use super::MediaTypeHandler;
use arkivo_core::{MediaFile, MediaResource};

/// Handler for PDF documents.
pub struct PdfHandler;

impl MediaTypeHandler for PdfHandler {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn supports(&self, file: &MediaFile, _resource: &MediaResource) -> bool {
        file.mime_type == "application/pdf"
    }
}
