//! Media type handlers and their registry.
//!
//! A media type is a named behavior attached to classified files. During
//! import the pipeline walks the bucket's configured media-type names in
//! order and assigns the first handler whose `supports` returns true; a file
//! no handler claims stays unclassified, which is a valid end state.
//!
//! Handlers are registered under the name they report, and bucket
//! configurations referencing unknown names are rejected when the importer is
//! constructed rather than at classification time.

use arkivo_core::{LibraryError, LibraryResult, Location, MediaFile, MediaResource};
use arkivo_storage::Bucket;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;

mod audio;
mod image;
mod other;
mod pdf;
mod url;

pub use audio::AudioHandler;
pub use image::ImageHandler;
pub use other::OtherHandler;
pub use pdf::PdfHandler;
pub use url::UrlHandler;

#[async_trait]
pub trait MediaTypeHandler: Send + Sync {
    /// Registry key; also the value stored in `MediaFile::media_type`.
    fn name(&self) -> &'static str;

    /// Whether this handler claims the file. Called in bucket order, so an
    /// early broad handler shadows later specific ones.
    fn supports(&self, file: &MediaFile, resource: &MediaResource) -> bool;

    /// Enrich the file after it has been claimed. Runs inside the import
    /// transaction; an error aborts the import.
    async fn process(
        &self,
        file: &mut MediaFile,
        resource: &MediaResource,
        bucket: &Bucket,
    ) -> LibraryResult<()> {
        let _ = (file, resource, bucket);
        Ok(())
    }

    /// Pick a location matching the criteria, `None` when nothing fits.
    /// The default answers with the file's primary location.
    fn suitable_location(&self, file: &MediaFile, criteria: &JsonValue) -> Option<Location> {
        let _ = criteria;
        file.location.clone()
    }
}

impl std::fmt::Debug for dyn MediaTypeHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MediaTypeHandler").field(&self.name()).finish()
    }
}

/// Immutable name-keyed set of media type handlers.
#[derive(Default)]
pub struct MediaTypeRegistry {
    handlers: HashMap<String, Arc<dyn MediaTypeHandler>>,
}

impl MediaTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in handlers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ImageHandler));
        registry.register(Arc::new(PdfHandler));
        registry.register(Arc::new(AudioHandler));
        registry.register(Arc::new(UrlHandler));
        registry.register(Arc::new(OtherHandler));
        registry
    }

    /// Register a handler under its own name, replacing any previous one.
    pub fn register(&mut self, handler: Arc<dyn MediaTypeHandler>) {
        self.handlers.insert(handler.name().to_string(), handler);
    }

    pub fn get(&self, name: &str) -> LibraryResult<Arc<dyn MediaTypeHandler>> {
        self.handlers
            .get(name)
            .cloned()
            .ok_or_else(|| LibraryError::UnknownMediaType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }
}
