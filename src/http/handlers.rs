//! Route handlers for the three service roles.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::time::Instant;

use crate::capability::SiteSession;
use crate::check::normalize::strip_target_host;
use crate::check::CheckRequest;
use crate::downstream::ForwardContext;
use crate::http::request::correlation_id;
use crate::http::response::raw_body;
use crate::http::server::{OrchestratorState, RegularState, WordpressState};
use crate::observability::metrics;

pub async fn healthz() -> &'static str {
    "ok"
}

/// `POST /orch`
pub async fn orchestrate(
    State(state): State<OrchestratorState>,
    headers: HeaderMap,
    Json(request): Json<CheckRequest>,
) -> Response {
    let start = Instant::now();
    let ctx = ForwardContext::from_headers(&headers);

    let response = match state.orchestrator.handle(&request, &ctx).await {
        Ok(reply) => reply.into_response(),
        Err(e) => {
            tracing::warn!(correlation_id = %ctx.correlation_id, error = %e, "Request failed");
            e.into_response()
        }
    };
    metrics::record_request("orchestrator", response.status().as_u16(), start);
    response
}

/// `POST /wordpress`
pub async fn wordpress_checks(
    State(state): State<WordpressState>,
    headers: HeaderMap,
    Json(request): Json<CheckRequest>,
) -> Response {
    let start = Instant::now();
    let session = SiteSession::from_headers(&headers);

    let response = match state.service.run_checks(&request, &session).await {
        Ok(body) => raw_body(StatusCode::OK, body),
        Err(e) => {
            tracing::warn!(
                correlation_id = %correlation_id(&headers),
                url = %request.url,
                error = %e,
                "WordPress checks failed"
            );
            e.into_response()
        }
    };
    metrics::record_request("wordpress", response.status().as_u16(), start);
    response
}

/// `POST /regular`
pub async fn regular_probe(
    State(state): State<RegularState>,
    headers: HeaderMap,
    Json(request): Json<CheckRequest>,
) -> Response {
    let start = Instant::now();
    let correlation_id = correlation_id(&headers);
    let host = strip_target_host(&request.url);

    let response = match state.probe.probe(host).await {
        Ok(outcome) => {
            tracing::info!(
                correlation_id = %correlation_id,
                url = %host,
                status_code = outcome.status,
                "Reachability probe recorded"
            );
            let status = StatusCode::from_u16(outcome.status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, outcome.body).into_response()
        }
        Err(e) => {
            tracing::warn!(correlation_id = %correlation_id, url = %host, error = %e, "Reachability probe failed");
            (StatusCode::BAD_GATEWAY, "Site unreachable").into_response()
        }
    };
    metrics::record_request("regular", response.status().as_u16(), start);
    response
}
