//! Request token middleware.
//!
//! The orchestrator checks the caller's public token; capability services
//! check the internal service-to-service token. Same header, different value.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::http::request::{correlation_id, ORCH_TOKEN};

/// Token a route requires in `Orch-Token`.
#[derive(Clone)]
pub struct RequiredToken(pub Arc<str>);

impl RequiredToken {
    pub fn new(token: impl AsRef<str>) -> Self {
        Self(Arc::from(token.as_ref()))
    }
}

pub async fn require_token(
    State(token): State<RequiredToken>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(ORCH_TOKEN)
        .and_then(|h| h.to_str().ok());

    if presented == Some(&*token.0) {
        return next.run(request).await;
    }

    tracing::warn!(
        correlation_id = %correlation_id(request.headers()),
        path = %request.uri().path(),
        "Invalid request token"
    );
    (StatusCode::UNAUTHORIZED, "Invalid Request Token.").into_response()
}
