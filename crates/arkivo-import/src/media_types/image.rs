use super::MediaTypeHandler;
use arkivo_core::{Location, MediaFile, MediaResource};
use serde_json::Value as JsonValue;

/// Handler for raster and vector images.
///
/// Preview variants live next to the original under
/// `previews/{width}x{height}/{path}`; `suitable_location` maps dimension
/// criteria onto that layout without checking whether the variant exists.
pub struct ImageHandler;

impl MediaTypeHandler for ImageHandler {
    fn name(&self) -> &'static str {
        "image"
    }

    fn supports(&self, file: &MediaFile, _resource: &MediaResource) -> bool {
        file.mime_type.starts_with("image/")
    }

    fn suitable_location(&self, file: &MediaFile, criteria: &JsonValue) -> Option<Location> {
        let width = criteria.get("width").and_then(JsonValue::as_u64);
        let height = criteria.get("height").and_then(JsonValue::as_u64);

        match (&file.location, width, height) {
            (Some(Location::File(path)), Some(w), Some(h)) => {
                Some(Location::file(format!("previews/{}x{}/{}", w, h, path)))
            }
            _ => file.location.clone(),
        }
    }
}
