//! Response construction and error mapping.
//!
//! # Responsibilities
//! - Map orchestrator and capability errors to HTTP status codes
//! - Pick a content type for spliced bodies
//!
//! # Design Decisions
//! - Client mistakes are 400; downstream failures are 502, timeouts 504
//! - Spliced bodies are only labelled JSON when they actually parse as JSON

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use crate::capability::CapabilityError;
use crate::orchestrator::{OrchestratedResponse, OrchestratorError};

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

/// `application/json` when `body` is one well-formed JSON value.
pub fn content_type_for(body: &[u8]) -> &'static str {
    if serde_json::from_slice::<serde::de::IgnoredAny>(body).is_ok() {
        JSON
    } else {
        TEXT
    }
}

/// Raw body with an inferred content type.
pub fn raw_body(status: StatusCode, body: Bytes) -> Response {
    (status, [(header::CONTENT_TYPE, content_type_for(&body))], body).into_response()
}

impl OrchestratorError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            OrchestratorError::UnsupportedPlatform(_) | OrchestratorError::EmptyTarget => {
                StatusCode::BAD_REQUEST
            }
            OrchestratorError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            OrchestratorError::DownstreamUnreachable { .. } | OrchestratorError::DownstreamError { .. } => {
                StatusCode::BAD_GATEWAY
            }
            OrchestratorError::DownstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for OrchestratorError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

impl CapabilityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CapabilityError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CapabilityError::SiteUnreachable { .. }
            | CapabilityError::SiteStatus { .. }
            | CapabilityError::InvalidListing(_)
            | CapabilityError::VersionFetchFailed { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for CapabilityError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

impl IntoResponse for OrchestratedResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        raw_body(status, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Platform;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(br#"[{"id":1}]"#), JSON);
        assert_eq!(content_type_for(br#"{"a":1}"#), JSON);
        assert_eq!(content_type_for(br#"[1][2]"#), TEXT);
        assert_eq!(content_type_for(b"example.com: OK"), TEXT);
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            OrchestratorError::UnsupportedPlatform("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            OrchestratorError::DownstreamTimeout { platform: Platform::Regular, secs: 1 }.status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            CapabilityError::SiteStatus { url: "u".into(), status: 401 }.status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_orchestrated_response_relays_status() {
        let response = OrchestratedResponse {
            status: 404,
            body: Bytes::from_static(b"Status Code Not OK"),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT);
    }
}
