//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sitecheck_requests_total` (counter): requests by role, status
//! - `sitecheck_request_duration_seconds` (histogram): latency distribution
//! - `sitecheck_cache_lookups_total` (counter): cache lookups by kind, result
//! - `sitecheck_cache_entries` (gauge): stored cache entries
//! - `sitecheck_downstream_requests_total` (counter): forwards by platform, outcome
//! - `sitecheck_version_scans_total` (counter): version lookups by outcome
//!
//! # Design Decisions
//! - `metrics` facade; recording is a no-op until an exporter is installed
//! - Prometheus exporter serves its own HTTP listener

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(role: &'static str, status: u16, start: Instant) {
    counter!("sitecheck_requests_total", "role" => role, "status" => status.to_string()).increment(1);
    histogram!("sitecheck_request_duration_seconds", "role" => role)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_cache_lookup(kind: &'static str, hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("sitecheck_cache_lookups_total", "kind" => kind, "result" => result).increment(1);
}

pub fn record_cache_size(size: usize) {
    gauge!("sitecheck_cache_entries").set(size as f64);
}

pub fn record_downstream(platform: &'static str, outcome: &'static str, start: Instant) {
    counter!("sitecheck_downstream_requests_total", "platform" => platform, "outcome" => outcome)
        .increment(1);
    histogram!("sitecheck_downstream_duration_seconds", "platform" => platform)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_version_scan(outcome: &'static str) {
    counter!("sitecheck_version_scans_total", "outcome" => outcome).increment(1);
}
