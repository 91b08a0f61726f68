//! Wire format of a site check request.
//!
//! The same shape travels inbound to the orchestrator and outbound to the
//! capability services, with capitalized field names.

use serde::{Deserialize, Serialize};

use crate::check::normalize::{
    normalize_check, normalize_platform, strip_target_host, CheckKind, NormalizedCheck, Platform,
};
use crate::orchestrator::types::OrchestratorError;

/// Request body for `/orch`, `/wordpress` and `/regular`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckRequest {
    /// Target site, optionally prefixed with a scheme and/or `www.`.
    #[serde(rename = "URL")]
    pub url: String,

    /// Free-form platform hint (`"WP"`, `"basic"`, ...).
    #[serde(rename = "Platform", default)]
    pub platform: String,

    /// Requested checks, free-form and in caller order.
    #[serde(rename = "Check", default)]
    pub checks: Vec<String>,
}

/// A request after host stripping and name canonicalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRequest {
    pub target_host: String,
    pub platform: Platform,
    /// Valid kinds, first occurrence order, without duplicates.
    pub checks: Vec<CheckKind>,
    /// Tokens that did not map onto a kind, in stripped form.
    pub invalid: Vec<String>,
}

impl CheckRequest {
    /// Build the body forwarded to a capability service.
    pub fn forward(target_host: &str, platform: Platform, checks: &[CheckKind]) -> Self {
        Self {
            url: target_host.to_string(),
            platform: platform.as_str().to_string(),
            checks: checks.iter().map(|k| k.as_str().to_string()).collect(),
        }
    }

    /// Canonicalize this request.
    ///
    /// Fails only on an unsupported platform or a blank target.
    pub fn normalize(&self) -> Result<NormalizedRequest, OrchestratorError> {
        let target_host = strip_target_host(&self.url);
        if target_host.is_empty() {
            return Err(OrchestratorError::EmptyTarget);
        }
        let platform = normalize_platform(&self.platform)?;

        let mut checks = Vec::with_capacity(self.checks.len());
        let mut invalid = Vec::new();
        for token in &self.checks {
            match normalize_check(token) {
                NormalizedCheck::Valid(kind) if checks.contains(&kind) => {
                    tracing::debug!(check = %kind, "Duplicate check ignored");
                }
                NormalizedCheck::Valid(kind) => checks.push(kind),
                NormalizedCheck::Invalid(value) => invalid.push(value),
            }
        }

        Ok(NormalizedRequest {
            target_host: target_host.to_string(),
            platform,
            checks,
            invalid,
        })
    }
}
