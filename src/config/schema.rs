//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for all three
//! service roles. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

/// Root configuration shared by the orchestrator and capability services.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SiteCheckConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Request token settings.
    pub auth: AuthConfig,

    /// Capability service addresses, as seen from the orchestrator.
    pub downstream: DownstreamConfig,

    /// Session check cache settings.
    pub cache: CacheConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Outbound calls to inspected sites and the version-metadata endpoint.
    pub sites: SitesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:4000"). Falls back to the role's port.
    pub bind_address: Option<String>,
}

/// Request token configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Token callers must present to the orchestrator in `Orch-Token`.
    /// Empty means a random one is generated at startup.
    pub orch_token: String,

    /// Service-to-service token between orchestrator and capability services.
    pub internal_token: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            orch_token: String::new(),
            // WARNING: This is a placeholder! Change this in production.
            internal_token: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

/// Addresses of the capability services.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DownstreamConfig {
    /// WordPress capability service (e.g., "127.0.0.1:4001").
    pub wordpress_address: String,

    /// Regular capability service (e.g., "127.0.0.1:4002").
    pub regular_address: String,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,

    /// Largest combined response buffered from a capability service, in bytes.
    pub max_response_size: usize,
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            wordpress_address: "127.0.0.1:4001".to_string(),
            regular_address: "127.0.0.1:4002".to_string(),
            timeout_secs: 30,
            max_response_size: 8 * 1024 * 1024, // 8MB
        }
    }
}

/// Session check cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry lifetime in seconds.
    pub ttl_secs: u64,

    /// Interval between sweeps of expired entries, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            sweep_interval_secs: 600,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Outbound calls made by the capability services.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SitesConfig {
    /// Scheme used to reach inspected sites.
    pub scheme: String,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,

    /// Version-metadata URL template; `{slug}` is replaced by the plugin slug.
    pub version_endpoint: String,

    /// Abort the whole plugin batch when one version fetch fails.
    pub fail_fast_versions: bool,
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            timeout_secs: 15,
            version_endpoint: "https://api.wordpress.org/plugins/info/1.0/{slug}".to_string(),
            fail_fast_versions: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}
