//! Capability service types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while inspecting a site.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// Inspected site could not be reached.
    #[error("Site unreachable: {url}: {reason}")]
    SiteUnreachable { url: String, reason: String },

    /// Inspected site answered with a non-success status.
    #[error("Site returned status {status} for {url}")]
    SiteStatus { url: String, status: u16 },

    /// Plugin listing was not the expected JSON array.
    #[error("Invalid plugin listing: {0}")]
    InvalidListing(String),

    /// Version metadata for one plugin could not be fetched; aborts the batch.
    #[error("Version fetch failed for plugin '{slug}': {reason}")]
    VersionFetchFailed { slug: String, reason: String },
}

/// Result type for capability operations.
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// One entry of the site's `/wp/v2/plugins` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct SitePlugin {
    /// Plugin file, e.g. `"akismet/akismet"`.
    pub plugin: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

impl SitePlugin {
    /// Directory slug used by the version-metadata endpoint.
    pub fn slug(&self) -> &str {
        self.plugin.split('/').next().unwrap_or(&self.plugin)
    }
}

/// Per-plugin entry in the `plugin` segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginReport {
    pub slug: String,
    pub name: String,
    pub installed: String,
    /// Latest published version, or `"N/A"`.
    pub latest: String,
    /// `None` when either version is unknown.
    pub outdated: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_slug() {
        let plugin = SitePlugin {
            plugin: "akismet/akismet".into(),
            name: "Akismet".into(),
            version: "5.3".into(),
        };
        assert_eq!(plugin.slug(), "akismet");

        let single = SitePlugin {
            plugin: "hello".into(),
            name: String::new(),
            version: String::new(),
        };
        assert_eq!(single.slug(), "hello");
    }

    #[test]
    fn test_error_display() {
        let err = CapabilityError::VersionFetchFailed {
            slug: "akismet".into(),
            reason: "timeout".into(),
        };
        assert_eq!(err.to_string(), "Version fetch failed for plugin 'akismet': timeout");
    }
}
