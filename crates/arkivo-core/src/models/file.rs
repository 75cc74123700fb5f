use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use super::location::Location;

/// A file managed by the media library.
///
/// Mutable while an import is in flight: the pipeline assigns the id and
/// location, detection fills the MIME fields, classification sets
/// `media_type`, and observers may touch anything. Timestamps belong to the
/// metadata store and are populated on persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFile {
    pub id: Option<Uuid>,
    pub name: String,
    pub location: Option<Location>,
    pub bucket: String,
    pub mime_type: String,
    pub charset: String,
    /// Registered media-type name, `None` while unclassified.
    pub media_type: Option<String>,
    /// Free-form options written by handlers and observers.
    pub type_options: JsonValue,
    pub owner: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, bucket: impl Into<String>) -> Self {
        MediaFile {
            name: name.into(),
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    /// Set one key in `type_options`, promoting a non-object value to an
    /// object first.
    pub fn set_type_option(&mut self, key: &str, value: JsonValue) {
        if !self.type_options.is_object() {
            self.type_options = JsonValue::Object(serde_json::Map::new());
        }
        if let Some(map) = self.type_options.as_object_mut() {
            map.insert(key.to_string(), value);
        }
    }

    pub fn type_option(&self, key: &str) -> Option<&JsonValue> {
        self.type_options.as_object().and_then(|map| map.get(key))
    }
}

impl Default for MediaFile {
    fn default() -> Self {
        MediaFile {
            id: None,
            name: String::new(),
            location: None,
            bucket: String::new(),
            mime_type: String::new(),
            charset: String::new(),
            media_type: None,
            type_options: JsonValue::Object(serde_json::Map::new()),
            owner: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Database row shape for `media_files`; converted to the domain model after
/// fetching so the rest of the library never sees column-level concerns.
#[cfg(feature = "sqlx")]
#[derive(Debug, Clone, FromRow)]
pub struct MediaFileRow {
    pub id: Uuid,
    pub name: String,
    pub location_kind: Option<String>,
    pub location_ref: Option<String>,
    pub bucket: String,
    pub mime_type: String,
    pub charset: String,
    pub media_type: Option<String>,
    pub type_options: JsonValue,
    pub owner_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(feature = "sqlx")]
impl MediaFileRow {
    pub fn into_media_file(self) -> MediaFile {
        let location = match (self.location_kind, self.location_ref) {
            (Some(kind), Some(reference)) => Location::from_parts(&kind, reference),
            _ => None,
        };
        MediaFile {
            id: Some(self.id),
            name: self.name,
            location,
            bucket: self.bucket,
            mime_type: self.mime_type,
            charset: self.charset,
            media_type: self.media_type,
            type_options: self.type_options,
            owner: self.owner_ref,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}
