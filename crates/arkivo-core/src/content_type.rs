//! Content-type detection and extension reconciliation
//!
//! Detection is layered: magic bytes first (via `infer`), then the declared
//! extension against a static table, then `application/octet-stream`. The
//! charset is a shallow sniff: plain-ASCII text is "us-ascii", valid
//! multi-byte UTF-8 text is "utf-8", everything non-text is "binary". Wire
//! formats with richer encoding signals are out of scope here; callers that
//! need more can inspect the bytes themselves.

use crate::constants::{CHARSET_ASCII, CHARSET_BINARY, OCTET_STREAM};

/// Conventional extensions per MIME type, in preference order. The first
/// extension of an entry is the canonical one `reconcile_extension` falls
/// back to. Extension-to-MIME lookups scan in declaration order, so more
/// common types sit first.
const MIME_EXTENSIONS: &[(&str, &[&str])] = &[
    ("image/jpeg", &["jpg", "jpeg"]),
    ("image/png", &["png"]),
    ("image/gif", &["gif"]),
    ("image/webp", &["webp"]),
    ("image/avif", &["avif"]),
    ("image/tiff", &["tif", "tiff"]),
    ("image/bmp", &["bmp"]),
    ("image/svg+xml", &["svg"]),
    ("image/x-icon", &["ico"]),
    ("application/pdf", &["pdf"]),
    ("application/zip", &["zip"]),
    ("application/gzip", &["gz"]),
    ("application/x-tar", &["tar"]),
    ("application/x-7z-compressed", &["7z"]),
    ("application/json", &["json"]),
    ("application/xml", &["xml"]),
    ("application/wasm", &["wasm"]),
    ("application/msword", &["doc"]),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        &["docx"],
    ),
    ("application/vnd.ms-excel", &["xls"]),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        &["xlsx"],
    ),
    ("text/plain", &["txt", "text", "log"]),
    ("text/csv", &["csv"]),
    ("text/html", &["html", "htm"]),
    ("text/css", &["css"]),
    ("text/markdown", &["md", "markdown"]),
    ("text/javascript", &["js", "mjs"]),
    ("audio/mpeg", &["mp3"]),
    ("audio/wav", &["wav"]),
    ("audio/x-wav", &["wav"]),
    ("audio/ogg", &["ogg", "oga"]),
    ("audio/flac", &["flac"]),
    ("audio/x-flac", &["flac"]),
    ("audio/aac", &["aac"]),
    ("audio/mp4", &["m4a"]),
    ("audio/m4a", &["m4a"]),
    ("video/mp4", &["mp4", "m4v"]),
    ("video/webm", &["webm"]),
    ("video/quicktime", &["mov"]),
    ("video/x-matroska", &["mkv"]),
    ("video/x-msvideo", &["avi"]),
    ("font/woff", &["woff"]),
    ("font/woff2", &["woff2"]),
    ("font/ttf", &["ttf"]),
    ("font/otf", &["otf"]),
];

/// Result of content detection: the MIME type plus the recorded charset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedContent {
    pub mime_type: String,
    pub charset: String,
}

/// Conventional extensions for a MIME type, empty when the type is unknown.
pub fn extensions_for_mime(mime_type: &str) -> &'static [&'static str] {
    MIME_EXTENSIONS
        .iter()
        .find(|(mime, _)| mime.eq_ignore_ascii_case(mime_type))
        .map(|(_, exts)| *exts)
        .unwrap_or(&[])
}

/// MIME type conventionally associated with an extension (case-insensitive).
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    let ext = extension.to_lowercase();
    MIME_EXTENSIONS
        .iter()
        .find(|(_, exts)| exts.contains(&ext.as_str()))
        .map(|(mime, _)| *mime)
}

/// Detect MIME type and charset in one shot.
///
/// Magic bytes win over the declared extension; the extension only decides
/// when the content carries no recognizable signature (plain text, SVG,
/// empty files). Unrecognized content falls through to
/// `application/octet-stream`.
pub fn detect(data: &[u8], declared_extension: &str) -> DetectedContent {
    let mime_type = infer::get(data)
        .map(|kind| kind.mime_type().to_string())
        .or_else(|| mime_for_extension(declared_extension).map(str::to_string))
        .unwrap_or_else(|| OCTET_STREAM.to_string());
    let charset = detect_charset(&mime_type, data).to_string();
    DetectedContent { mime_type, charset }
}

/// Reconcile a declared extension with the detected MIME type.
///
/// The declared extension is kept when it belongs to the type's conventional
/// set, or when the type has no conventional extensions at all. Otherwise
/// the type's canonical extension replaces it. The result is lowercase.
pub fn reconcile_extension(mime_type: &str, declared: &str) -> String {
    let declared = declared.to_lowercase();
    let conventional = extensions_for_mime(mime_type);
    if conventional.is_empty() || conventional.contains(&declared.as_str()) {
        declared
    } else {
        conventional[0].to_string()
    }
}

fn detect_charset(mime_type: &str, data: &[u8]) -> &'static str {
    if !mime_type.starts_with("text/") {
        return CHARSET_BINARY;
    }
    if data.is_ascii() {
        return CHARSET_ASCII;
    }
    if std::str::from_utf8(data).is_ok() {
        "utf-8"
    } else {
        CHARSET_ASCII
    }
}
