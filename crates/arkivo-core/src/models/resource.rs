use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the bytes of an import request come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ref", rename_all = "lowercase")]
pub enum MediaSource {
    Path(PathBuf),
    Url(String),
}

/// An import request: a source plus optional display name and owner.
///
/// The display name drives the declared extension, which in turn feeds
/// content detection and the blob path. When no name is given it is derived
/// from the last path or URL segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaResource {
    pub source: MediaSource,
    pub name: Option<String>,
    pub owner: Option<String>,
}

impl MediaResource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        MediaResource {
            source: MediaSource::Path(path.into()),
            name: None,
            owner: None,
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        MediaResource {
            source: MediaSource::Url(url.into()),
            name: None,
            owner: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn is_url(&self) -> bool {
        matches!(self.source, MediaSource::Url(_))
    }

    /// Explicit name when given, else the last path or URL segment,
    /// else "unnamed".
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            if !name.is_empty() {
                return name.clone();
            }
        }
        let derived = match &self.source {
            MediaSource::Path(path) => name_from_path(path),
            MediaSource::Url(url) => name_from_url(url),
        };
        derived.unwrap_or_else(|| "unnamed".to_string())
    }

    /// Lowercased extension of the display name, empty when it has none.
    pub fn declared_extension(&self) -> String {
        match self.display_name().rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_lowercase(),
            _ => String::new(),
        }
    }
}

fn name_from_path(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

fn name_from_url(url: &str) -> Option<String> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    let after_scheme = without_query
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(without_query);
    let (_, path) = after_scheme.split_once('/')?;
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
}
