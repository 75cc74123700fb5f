//! Shared constants used across Arkivo components

/// Bucket used when an import does not name one.
pub const DEFAULT_BUCKET: &str = "default";

/// MIME type assigned when neither magic bytes nor the extension identify the content.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Charset recorded for non-text content.
pub const CHARSET_BINARY: &str = "binary";

/// Charset recorded for plain-ASCII text content.
pub const CHARSET_ASCII: &str = "us-ascii";
