use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

/// Where a managed file's content lives.
///
/// `File` holds a bucket-relative blob path; `Url` is an external reference
/// whose bytes the library never stored. Locations are immutable values;
/// moving a file means constructing a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ref", rename_all = "lowercase")]
pub enum Location {
    File(String),
    Url(String),
}

impl Location {
    pub fn file(path: impl Into<String>) -> Self {
        Location::File(path.into())
    }

    pub fn url(url: impl Into<String>) -> Self {
        Location::Url(url.into())
    }

    /// Rebuild from the two metadata columns; `None` for an unknown kind.
    pub fn from_parts(kind: &str, reference: String) -> Option<Self> {
        match kind {
            "file" => Some(Location::File(reference)),
            "url" => Some(Location::Url(reference)),
            _ => None,
        }
    }

    /// The discriminant stored in the metadata row.
    pub fn kind(&self) -> &'static str {
        match self {
            Location::File(_) => "file",
            Location::Url(_) => "url",
        }
    }

    /// The blob path or URL string.
    pub fn as_str(&self) -> &str {
        match self {
            Location::File(path) => path,
            Location::Url(url) => url,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Location::File(_))
    }

    pub fn is_url(&self) -> bool {
        matches!(self, Location::Url(_))
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Derive the blob path for a file id.
///
/// The path is the SHA-1 of the hyphenated lowercase UUID string, hex
/// encoded, with the reconciled extension appended. An empty extension
/// yields a bare hash with no trailing dot. Content never influences the
/// path, so rewrites land on the same blob.
pub fn blob_path(id: Uuid, extension: &str) -> String {
    let digest = Sha1::digest(id.to_string().as_bytes());
    let hash = hex::encode(digest);
    if extension.is_empty() {
        hash
    } else {
        format!("{}.{}", hash, extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_path_known_digest() {
        let id = Uuid::parse_str("9c5b94b1-35ad-49bb-b118-8e8fc24abf80").unwrap();
        assert_eq!(
            blob_path(id, "png"),
            "616334f771b8732f626504ff3305de2c3ec3322b.png"
        );
    }

    #[test]
    fn test_blob_path_nil_uuid() {
        assert_eq!(
            blob_path(Uuid::nil(), "pdf"),
            "b602d594afd2b0b327e07a06f36ca6a7e42546d0.pdf"
        );
    }

    #[test]
    fn test_blob_path_without_extension() {
        let id = Uuid::parse_str("f81d4fae-7dec-11d0-a765-00a0c91e6bf6").unwrap();
        let path = blob_path(id, "");
        assert_eq!(path, "ab6a761f4f3423853867191aa308e477bd30daeb");
        assert!(!path.contains('.'));
    }

    #[test]
    fn test_blob_path_is_stable_per_id() {
        let id = Uuid::new_v4();
        assert_eq!(blob_path(id, "jpg"), blob_path(id, "jpg"));
        assert_ne!(blob_path(id, "jpg"), blob_path(Uuid::new_v4(), "jpg"));
    }

    #[test]
    fn test_location_kind_round_trip() {
        let file = Location::file("ab12.png");
        let url = Location::url("https://example.com/a.png");
        assert_eq!(
            Location::from_parts(file.kind(), file.as_str().to_string()),
            Some(file.clone())
        );
        assert_eq!(
            Location::from_parts(url.kind(), url.as_str().to_string()),
            Some(url)
        );
        assert_eq!(Location::from_parts("tape", "x".to_string()), None);
        assert!(file.is_file());
        assert!(!file.is_url());
    }

    #[test]
    fn test_location_serde_tagging() {
        let loc = Location::file("ab12.png");
        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json["kind"], "file");
        assert_eq!(json["ref"], "ab12.png");
        let back: Location = serde_json::from_value(json).unwrap();
        assert_eq!(back, loc);
    }
}
