//! Regular capability service: plain reachability probe.

use crate::capability::types::{CapabilityError, CapabilityResult};
use crate::capability::wordpress::site_client;
use crate::config::SitesConfig;

/// Result of probing a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Status answered by the site, relayed to the caller.
    pub status: u16,
    pub body: String,
}

/// Issues a `GET` against the site root.
#[derive(Clone)]
pub struct ReachabilityProbe {
    client: reqwest::Client,
    scheme: String,
}

impl ReachabilityProbe {
    pub fn new(config: &SitesConfig) -> CapabilityResult<Self> {
        Ok(Self {
            client: site_client(config)?,
            scheme: config.scheme.clone(),
        })
    }

    pub async fn probe(&self, host: &str) -> CapabilityResult<ProbeOutcome> {
        let url = format!("{}://{}", self.scheme, host);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CapabilityError::SiteUnreachable {
                url,
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = if status.is_success() {
            format!("{}: OK", host)
        } else {
            "Status Code Not OK".to_string()
        };
        Ok(ProbeOutcome {
            status: status.as_u16(),
            body,
        })
    }
}
