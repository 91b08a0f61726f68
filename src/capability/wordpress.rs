//! WordPress capability service.
//!
//! Runs the requested checks against a site's REST API and concatenates the
//! results into one combined body, always in the order plugin, config, user.
//! The orchestrator splits that body back apart by position, so the order
//! here is part of the wire contract.

use axum::http::HeaderMap;
use bytes::{Bytes, BytesMut};
use std::time::Duration;

use crate::cache::SessionNonce;
use crate::capability::plugins::VersionLookup;
use crate::capability::types::{CapabilityError, CapabilityResult, SitePlugin};
use crate::check::normalize::{normalize_check, strip_target_host, NormalizedCheck};
use crate::check::{CheckKind, CheckRequest};
use crate::config::SitesConfig;
use crate::http::request::{cookie, session_nonce, WP_NONCE};

/// Credentials relayed from the caller to the inspected site.
#[derive(Debug, Clone, Default)]
pub struct SiteSession {
    pub nonce: SessionNonce,
    pub cookie: Option<String>,
}

impl SiteSession {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            nonce: session_nonce(headers),
            cookie: cookie(headers),
        }
    }
}

/// Build the outbound HTTP client shared by the capability services.
pub fn site_client(config: &SitesConfig) -> CapabilityResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(concat!("site-orchestrator/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Runs plugin, config and user checks against WordPress sites.
#[derive(Clone)]
pub struct WordpressService {
    client: reqwest::Client,
    scheme: String,
    versions: VersionLookup,
}

impl WordpressService {
    pub fn new(config: &SitesConfig) -> CapabilityResult<Self> {
        let client = site_client(config)?;
        Ok(Self {
            versions: VersionLookup::new(client.clone(), config),
            client,
            scheme: config.scheme.clone(),
        })
    }

    /// REST endpoint for `route` on `host`.
    pub fn endpoint(&self, host: &str, route: &str) -> String {
        format!("{}://{}/wp-json/wp/v2/{}", self.scheme, host, route)
    }

    async fn fetch(&self, host: &str, route: &str, session: &SiteSession) -> CapabilityResult<Bytes> {
        let url = self.endpoint(host, route);
        let mut request = self.client.get(&url);
        if !session.nonce.is_empty() {
            request = request.header(WP_NONCE, session.nonce.as_str());
        }
        if let Some(cookie) = &session.cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        let response = request.send().await.map_err(|e| CapabilityError::SiteUnreachable {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(CapabilityError::SiteStatus {
                url,
                status: status.as_u16(),
            });
        }
        response
            .bytes()
            .await
            .map_err(|e| CapabilityError::SiteUnreachable {
                url,
                reason: e.to_string(),
            })
    }

    async fn plugins(&self, host: &str, session: &SiteSession) -> CapabilityResult<Bytes> {
        let listing = self.fetch(host, "plugins", session).await?;
        let plugins: Vec<SitePlugin> = serde_json::from_slice(&listing)
            .map_err(|e| CapabilityError::InvalidListing(e.to_string()))?;
        tracing::debug!(count = plugins.len(), "Scanning plugin versions");

        let reports = self.versions.scan_all(&plugins).await?;
        serde_json::to_vec(&reports)
            .map(Bytes::from)
            .map_err(|e| CapabilityError::InvalidListing(e.to_string()))
    }

    async fn run_check(&self, kind: CheckKind, host: &str, session: &SiteSession) -> CapabilityResult<Bytes> {
        match kind {
            CheckKind::Plugin => self.plugins(host, session).await,
            CheckKind::Config => self.fetch(host, "settings", session).await,
            CheckKind::User => self.fetch(host, "users?orderby=name", session).await,
        }
    }

    /// Run every requested check and concatenate the results.
    pub async fn run_checks(&self, request: &CheckRequest, session: &SiteSession) -> CapabilityResult<Bytes> {
        let host = strip_target_host(&request.url);
        let requested: Vec<CheckKind> = request
            .checks
            .iter()
            .filter_map(|token| match normalize_check(token) {
                NormalizedCheck::Valid(kind) => Some(kind),
                NormalizedCheck::Invalid(_) => None,
            })
            .collect();

        let mut combined = BytesMut::new();
        for kind in CheckKind::EMIT_ORDER {
            if !requested.contains(&kind) {
                continue;
            }
            let segment = self.run_check(kind, host, session).await?;
            tracing::debug!(check = %kind, bytes = segment.len(), "Check complete");
            combined.extend_from_slice(&segment);
        }
        Ok(combined.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let service = WordpressService::new(&SitesConfig::default()).unwrap();
        assert_eq!(
            service.endpoint("example.com", "users"),
            "https://example.com/wp-json/wp/v2/users"
        );
    }

    #[test]
    fn test_site_session_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(WP_NONCE, "abc".parse().unwrap());
        headers.insert(axum::http::header::COOKIE, "wordpress_logged_in=1".parse().unwrap());

        let session = SiteSession::from_headers(&headers);
        assert_eq!(session.nonce.as_str(), "abc");
        assert_eq!(session.cookie.as_deref(), Some("wordpress_logged_in=1"));
    }
}
