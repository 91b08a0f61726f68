//! Latest-version extraction from legacy serialized plugin metadata.
//!
//! The metadata endpoint answers with a PHP-serialized object. Rather than
//! deserializing it, the scanner relies on the layout of one format revision:
//! ```text
//! O:8:"stdClass":25:{s:4:"name";s:7:"Akismet";...;s:7:"version";s:5:"5.3.1";...
//!                ^^ bytes 15..17: property count, "25" for the supported revision
//! ```
//! The value following the first `;s:5:` marker is taken as the version.
//! Anything unexpected degrades to `"N/A"`.

/// Placeholder for an unknown version.
pub const NOT_AVAILABLE: &str = "N/A";

const REVISION_OFFSET: usize = 15;
const SUPPORTED_REVISION: &[u8] = b"25";
const VERSION_MARKER: &[u8] = b";s:5:";
/// Marker plus opening quote.
const VALUE_OFFSET: usize = 6;

/// True when `blob` carries the supported revision tag.
pub fn is_supported_revision(blob: &[u8]) -> bool {
    blob.get(REVISION_OFFSET..REVISION_OFFSET + SUPPORTED_REVISION.len()) == Some(SUPPORTED_REVISION)
}

/// Extract the latest version string, or [`NOT_AVAILABLE`].
pub fn extract_latest_version(blob: &[u8]) -> String {
    if !is_supported_revision(blob) {
        tracing::debug!("Unsupported metadata revision");
        return NOT_AVAILABLE.to_string();
    }

    let Some(marker) = blob
        .windows(VERSION_MARKER.len())
        .position(|w| w == VERSION_MARKER)
    else {
        return NOT_AVAILABLE.to_string();
    };

    let Some(value) = blob.get(marker + VALUE_OFFSET..) else {
        return NOT_AVAILABLE.to_string();
    };
    match value.iter().position(|&b| b == b'"') {
        Some(end) => String::from_utf8_lossy(&value[..end]).into_owned(),
        None => NOT_AVAILABLE.to_string(),
    }
}
