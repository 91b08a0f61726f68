//! Orchestrator result and error types.

use bytes::Bytes;
use thiserror::Error;

use crate::check::{CheckKind, Platform};

/// Errors that terminate an orchestrated request.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Platform hint did not map onto a capability service.
    #[error("Requested Site Type Error: {0}")]
    UnsupportedPlatform(String),

    /// URL was blank once scheme and `www.` were stripped.
    #[error("Request URL must not be empty")]
    EmptyTarget,

    /// Forwarded request body could not be encoded.
    #[error("Failed to encode forwarded request: {0}")]
    Encode(#[from] serde_json::Error),

    /// Capability service could not be reached.
    #[error("{platform} service unreachable: {reason}")]
    DownstreamUnreachable { platform: Platform, reason: String },

    /// Capability service did not answer in time.
    #[error("{platform} service timed out after {secs} seconds")]
    DownstreamTimeout { platform: Platform, secs: u64 },

    /// Capability service answered but its response could not be read.
    #[error("{platform} service error: {reason}")]
    DownstreamError { platform: Platform, reason: String },
}

/// Result type for orchestrator operations.
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Routing decision for one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Service the request is forwarded to.
    pub platform: Platform,
    /// Kinds that still have to be fetched.
    pub forward: Vec<CheckKind>,
    /// Cache hits, in request order.
    pub cached: Vec<(CheckKind, Bytes)>,
}

impl Dispatch {
    /// Cached fragment bytes in request order.
    pub fn cached_fragments(&self) -> Vec<Bytes> {
        self.cached.iter().map(|(_, b)| b.clone()).collect()
    }

    /// True when every requested kind was served from cache and the request
    /// was downgraded to a reachability probe.
    pub fn is_downgraded(&self) -> bool {
        !self.cached.is_empty() && self.forward.is_empty() && self.platform == Platform::Regular
    }
}

/// Final reply produced for the caller.
#[derive(Debug, Clone)]
pub struct OrchestratedResponse {
    /// Status relayed from the capability service.
    pub status: u16,
    pub body: Bytes,
}
