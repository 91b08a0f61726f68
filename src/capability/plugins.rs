//! Plugin inventory: installed versions against latest published versions.
//!
//! # Responsibilities
//! - Look up each plugin's metadata blob, one round trip per plugin
//! - Scan the blob for the latest version
//! - Build the `plugin` segment
//!
//! # Design Decisions
//! - Lookups are sequential, in listing order
//! - Fail-fast by default: one failed lookup aborts the batch
//! - Unparsable metadata is not a failure; it reports `"N/A"`

use bytes::Bytes;

use crate::capability::types::{CapabilityError, CapabilityResult, PluginReport, SitePlugin};
use crate::capability::version_scan::{extract_latest_version, NOT_AVAILABLE};
use crate::config::SitesConfig;
use crate::observability::metrics;

/// Compare dotted numeric versions. `None` when either side is unknown or
/// not numeric.
pub fn is_outdated(installed: &str, latest: &str) -> Option<bool> {
    fn parts(v: &str) -> Option<Vec<u64>> {
        v.split('.').map(|p| p.trim().parse().ok()).collect()
    }
    if installed.is_empty() || latest == NOT_AVAILABLE {
        return None;
    }
    let (mut a, mut b) = (parts(installed)?, parts(latest)?);
    let len = a.len().max(b.len());
    a.resize(len, 0);
    b.resize(len, 0);
    Some(a < b)
}

/// Client for the version-metadata endpoint.
#[derive(Clone)]
pub struct VersionLookup {
    client: reqwest::Client,
    endpoint: String,
    fail_fast: bool,
}

impl VersionLookup {
    pub fn new(client: reqwest::Client, config: &SitesConfig) -> Self {
        Self {
            client,
            endpoint: config.version_endpoint.clone(),
            fail_fast: config.fail_fast_versions,
        }
    }

    /// Metadata URL for `slug`.
    pub fn url_for(&self, slug: &str) -> String {
        self.endpoint.replace("{slug}", slug)
    }

    async fn fetch_blob(&self, slug: &str) -> CapabilityResult<Bytes> {
        let failed = |reason: String| CapabilityError::VersionFetchFailed {
            slug: slug.to_string(),
            reason,
        };
        let response = self
            .client
            .get(self.url_for(slug))
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(failed(format!("status {}", response.status())));
        }
        response.bytes().await.map_err(|e| failed(e.to_string()))
    }

    /// Latest published version of `slug`.
    pub async fn latest_version(&self, slug: &str) -> CapabilityResult<String> {
        let blob = self.fetch_blob(slug).await?;
        let version = extract_latest_version(&blob);
        metrics::record_version_scan(if version == NOT_AVAILABLE { "unavailable" } else { "found" });
        Ok(version)
    }

    /// Build a report for every plugin in `plugins`.
    pub async fn scan_all(&self, plugins: &[SitePlugin]) -> CapabilityResult<Vec<PluginReport>> {
        let mut reports = Vec::with_capacity(plugins.len());
        for plugin in plugins {
            let slug = plugin.slug();
            let latest = match self.latest_version(slug).await {
                Ok(v) => v,
                Err(e) if !self.fail_fast => {
                    metrics::record_version_scan("failed");
                    tracing::warn!(slug = %slug, error = %e, "Version lookup failed, reporting N/A");
                    NOT_AVAILABLE.to_string()
                }
                Err(e) => {
                    metrics::record_version_scan("failed");
                    tracing::warn!(slug = %slug, error = %e, "Version lookup failed, aborting batch");
                    return Err(e);
                }
            };
            reports.push(PluginReport {
                slug: slug.to_string(),
                name: plugin.name.clone(),
                installed: plugin.version.clone(),
                outdated: is_outdated(&plugin.version, &latest),
                latest,
            });
        }
        Ok(reports)
    }
}
