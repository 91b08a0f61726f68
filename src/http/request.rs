//! Request headers shared by every service role.
//!
//! # Responsibilities
//! - Name the headers exchanged between caller, orchestrator and services
//! - Generate a correlation ID when the caller did not send one
//! - Extract session credentials for relaying
//!
//! # Design Decisions
//! - Correlation ID added as early as possible for tracing
//! - Capability services reuse the orchestrator's ID instead of minting one

use axum::http::{header, HeaderMap, HeaderName};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::cache::SessionNonce;

/// Correlation identifier carried across every hop.
pub const CORRELATION_ID: HeaderName = HeaderName::from_static("correlation-id");

/// Request token (public for the orchestrator, internal for services).
pub const ORCH_TOKEN: HeaderName = HeaderName::from_static("orch-token");

/// WordPress REST nonce, doubling as the cache session scope.
pub const WP_NONCE: HeaderName = HeaderName::from_static("x-wp-nonce");

fn header_str(headers: &HeaderMap, name: impl header::AsHeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Correlation ID of the request, `"unknown"` if absent.
pub fn correlation_id(headers: &HeaderMap) -> String {
    header_str(headers, CORRELATION_ID)
        .unwrap_or("unknown")
        .to_string()
}

/// Session nonce of the request; empty if absent.
pub fn session_nonce(headers: &HeaderMap) -> SessionNonce {
    SessionNonce::new(header_str(headers, WP_NONCE).unwrap_or_default().trim())
}

/// Raw `Cookie` header, relayed verbatim.
pub fn cookie(headers: &HeaderMap) -> Option<String> {
    header_str(headers, header::COOKIE).map(str::to_string)
}

/// Layer assigning a UUID v4 correlation ID when none is present.
pub fn set_correlation_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(CORRELATION_ID, MakeRequestUuid)
}

/// Layer echoing the correlation ID on the response.
pub fn propagate_correlation_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(CORRELATION_ID)
}
