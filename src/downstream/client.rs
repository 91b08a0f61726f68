//! Service-to-service client for the capability services.
//!
//! # Responsibilities
//! - Build `POST /<platform>` requests with the internal token
//! - Relay correlation ID, and for WordPress the session nonce and cookie
//! - Enforce a per-call deadline
//! - Buffer the combined response body, up to `max_response_size`
//!
//! # Design Decisions
//! - No retries; every failure is surfaced to the caller immediately
//! - No cancellation: a call runs to completion or timeout

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, Response, StatusCode};
use bytes::Bytes;
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::time::{Duration, Instant};

use crate::cache::SessionNonce;
use crate::check::{CheckRequest, Platform};
use crate::config::DownstreamConfig;
use crate::http::request::{correlation_id, cookie, session_nonce, CORRELATION_ID, ORCH_TOKEN, WP_NONCE};
use crate::observability::metrics;
use crate::orchestrator::types::{OrchestratorError, OrchestratorResult};

/// Per-request values relayed to the capability service.
#[derive(Debug, Clone, Default)]
pub struct ForwardContext {
    pub correlation_id: String,
    pub nonce: SessionNonce,
    pub cookie: Option<String>,
}

impl ForwardContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            correlation_id: correlation_id(headers),
            nonce: session_nonce(headers),
            cookie: cookie(headers),
        }
    }
}

/// Buffered answer from a capability service.
#[derive(Debug, Clone)]
pub struct DownstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// HTTP client for the `wordpress` and `regular` services.
#[derive(Clone)]
pub struct DownstreamClient {
    client: Client<HttpConnector, Body>,
    wordpress_address: String,
    regular_address: String,
    internal_token: String,
    timeout: Duration,
    max_response_size: usize,
}

impl DownstreamClient {
    pub fn new(config: &DownstreamConfig, internal_token: impl Into<String>) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            wordpress_address: config.wordpress_address.clone(),
            regular_address: config.regular_address.clone(),
            internal_token: internal_token.into(),
            timeout: Duration::from_secs(config.timeout_secs),
            max_response_size: config.max_response_size,
        }
    }

    fn address(&self, platform: Platform) -> &str {
        match platform {
            Platform::Wordpress => &self.wordpress_address,
            Platform::Regular => &self.regular_address,
        }
    }

    fn build_request(
        &self,
        platform: Platform,
        body: &CheckRequest,
        ctx: &ForwardContext,
    ) -> OrchestratorResult<Request<Body>> {
        let payload = serde_json::to_vec(body)?;
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(format!("http://{}/{}", self.address(platform), platform))
            .header(header::CONTENT_TYPE, "application/json")
            .header(ORCH_TOKEN, self.internal_token.as_str())
            .header(CORRELATION_ID, ctx.correlation_id.as_str());

        if platform == Platform::Wordpress {
            builder = builder.header(WP_NONCE, ctx.nonce.as_str());
            if let Some(cookie) = &ctx.cookie {
                builder = builder.header(header::COOKIE, cookie.as_str());
            }
        }

        builder
            .body(Body::from(payload))
            .map_err(|e| OrchestratorError::DownstreamError {
                platform,
                reason: e.to_string(),
            })
    }

    async fn read_body(
        &self,
        platform: Platform,
        response: Response<Incoming>,
    ) -> OrchestratorResult<DownstreamResponse> {
        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(body), self.max_response_size)
            .await
            .map_err(|e| OrchestratorError::DownstreamError {
                platform,
                reason: e.to_string(),
            })?;
        Ok(DownstreamResponse {
            status: parts.status,
            body,
        })
    }

    /// Send `body` to the `platform` service and buffer its answer.
    pub async fn forward(
        &self,
        platform: Platform,
        body: &CheckRequest,
        ctx: &ForwardContext,
    ) -> OrchestratorResult<DownstreamResponse> {
        let start = Instant::now();
        let request = self.build_request(platform, body, ctx)?;

        let exchange = async {
            let response = self.client.request(request).await.map_err(|e| {
                OrchestratorError::DownstreamUnreachable {
                    platform,
                    reason: e.to_string(),
                }
            })?;
            self.read_body(platform, response).await
        };

        let result = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(OrchestratorError::DownstreamTimeout {
                platform,
                secs: self.timeout.as_secs(),
            }),
        };

        let outcome = match &result {
            Ok(r) if r.status.is_success() => "ok",
            Ok(_) => "status",
            Err(OrchestratorError::DownstreamTimeout { .. }) => "timeout",
            Err(_) => "error",
        };
        metrics::record_downstream(platform.as_str(), outcome, start);

        match &result {
            Ok(r) => tracing::debug!(
                platform = %platform,
                status = %r.status,
                bytes = r.body.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Downstream response received"
            ),
            Err(e) => tracing::error!(platform = %platform, error = %e, "Downstream request failed"),
        }
        result
    }
}
