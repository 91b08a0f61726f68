//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check the version endpoint template is usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SiteCheckConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::SiteCheckConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(field, format!("invalid socket address '{}'", value)));
    }
}

fn check_nonzero(errors: &mut Vec<ValidationError>, field: &'static str, value: u64) {
    if value == 0 {
        errors.push(ValidationError::new(field, "must be greater than zero"));
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &SiteCheckConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(bind) = &config.listener.bind_address {
        check_addr(&mut errors, "listener.bind_address", bind);
    }
    check_addr(&mut errors, "downstream.wordpress_address", &config.downstream.wordpress_address);
    check_addr(&mut errors, "downstream.regular_address", &config.downstream.regular_address);
    if config.observability.metrics_enabled {
        check_addr(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }

    check_nonzero(&mut errors, "downstream.timeout_secs", config.downstream.timeout_secs);
    check_nonzero(&mut errors, "cache.ttl_secs", config.cache.ttl_secs);
    check_nonzero(&mut errors, "cache.sweep_interval_secs", config.cache.sweep_interval_secs);
    check_nonzero(&mut errors, "timeouts.request_secs", config.timeouts.request_secs);
    check_nonzero(&mut errors, "sites.timeout_secs", config.sites.timeout_secs);

    if config.auth.internal_token.is_empty() {
        errors.push(ValidationError::new("auth.internal_token", "must not be empty"));
    }

    if !matches!(config.sites.scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::new(
            "sites.scheme",
            format!("unsupported scheme '{}'", config.sites.scheme),
        ));
    }

    let endpoint = &config.sites.version_endpoint;
    if !endpoint.contains("{slug}") {
        errors.push(ValidationError::new("sites.version_endpoint", "missing {slug} placeholder"));
    } else if let Err(e) = url::Url::parse(&endpoint.replace("{slug}", "probe")) {
        errors.push(ValidationError::new("sites.version_endpoint", e.to_string()));
    }

    if config.downstream.max_response_size == 0 {
        errors.push(ValidationError::new("downstream.max_response_size", "must be greater than zero"));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than zero"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&SiteCheckConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = SiteCheckConfig::default();
        config.downstream.wordpress_address = "not-an-addr".into();
        config.cache.ttl_secs = 0;
        config.sites.version_endpoint = "https://api.example.org/info".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["downstream.wordpress_address", "cache.ttl_secs", "sites.version_endpoint"]
        );
    }

    #[test]
    fn test_rejects_unknown_scheme() {
        let mut config = SiteCheckConfig::default();
        config.sites.scheme = "ftp".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].to_string(), "sites.scheme: unsupported scheme 'ftp'");
    }

    #[test]
    fn test_rejects_zero_response_cap() {
        let mut config = SiteCheckConfig::default();
        config.downstream.max_response_size = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "downstream.max_response_size");
    }
}
