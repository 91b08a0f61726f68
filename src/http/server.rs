//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router for one service role
//! - Wire up middleware (tracing, limits, correlation ID, request token)
//! - Bind server to listener
//! - Run the cache sweeper next to the orchestrator
//! - Drain in-flight requests on shutdown

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::cache::SessionCache;
use crate::capability::{CapabilityError, ReachabilityProbe, WordpressService};
use crate::config::SiteCheckConfig;
use crate::downstream::DownstreamClient;
use crate::http::handlers;
use crate::http::middleware::{require_token, RequiredToken};
use crate::http::request::{correlation_id, propagate_correlation_id_layer, set_correlation_id_layer};
use crate::orchestrator::Orchestrator;

/// Which of the three services this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ServiceRole {
    Orchestrator,
    Wordpress,
    Regular,
}

impl ServiceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceRole::Orchestrator => "orchestrator",
            ServiceRole::Wordpress => "wordpress",
            ServiceRole::Regular => "regular",
        }
    }

    /// Used when `listener.bind_address` is not configured.
    pub fn default_bind_address(&self) -> &'static str {
        match self {
            ServiceRole::Orchestrator => "0.0.0.0:4000",
            ServiceRole::Wordpress => "0.0.0.0:4001",
            ServiceRole::Regular => "0.0.0.0:4002",
        }
    }
}

impl std::fmt::Display for ServiceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct OrchestratorState {
    pub orchestrator: Arc<Orchestrator>,
}

#[derive(Clone)]
pub struct WordpressState {
    pub service: WordpressService,
}

#[derive(Clone)]
pub struct RegularState {
    pub probe: ReachabilityProbe,
}

/// HTTP server for one service role.
pub struct HttpServer {
    role: ServiceRole,
    router: Router,
    config: SiteCheckConfig,
    cache: Option<SessionCache>,
}

impl HttpServer {
    /// Create a server for `role`. Fails only if an outbound client cannot be built.
    pub fn new(role: ServiceRole, config: SiteCheckConfig) -> Result<Self, CapabilityError> {
        let mut cache = None;

        let routes = match role {
            ServiceRole::Orchestrator => {
                let session_cache = SessionCache::from_config(&config.cache);
                let downstream =
                    DownstreamClient::new(&config.downstream, config.auth.internal_token.clone());
                let state = OrchestratorState {
                    orchestrator: Arc::new(Orchestrator::new(session_cache.clone(), downstream)),
                };
                cache = Some(session_cache);

                Router::new()
                    .route("/orch", post(handlers::orchestrate))
                    .route_layer(middleware::from_fn_with_state(
                        RequiredToken::new(&config.auth.orch_token),
                        require_token,
                    ))
                    .with_state(state)
            }
            ServiceRole::Wordpress => {
                let state = WordpressState {
                    service: WordpressService::new(&config.sites)?,
                };
                Router::new()
                    .route("/wordpress", post(handlers::wordpress_checks))
                    .route_layer(middleware::from_fn_with_state(
                        RequiredToken::new(&config.auth.internal_token),
                        require_token,
                    ))
                    .with_state(state)
            }
            ServiceRole::Regular => {
                let state = RegularState {
                    probe: ReachabilityProbe::new(&config.sites)?,
                };
                Router::new()
                    .route("/regular", post(handlers::regular_probe))
                    .route_layer(middleware::from_fn_with_state(
                        RequiredToken::new(&config.auth.internal_token),
                        require_token,
                    ))
                    .with_state(state)
            }
        };

        let router = Self::build_router(&config, routes);
        Ok(Self {
            role,
            router,
            config,
            cache,
        })
    }

    /// Wrap role routes with the shared middleware stack.
    #[allow(deprecated)]
    fn build_router(config: &SiteCheckConfig, routes: Router) -> Router {
        routes
            .route("/healthz", get(handlers::healthz))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_correlation_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    correlation_id = %correlation_id(request.headers()),
                )
            }))
            .layer(set_correlation_id_layer())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(role = %self.role, address = %addr, "HTTP server starting");

        let sweeper = self.cache.as_ref().map(|cache| {
            cache.spawn_sweeper(
                Duration::from_secs(self.config.cache.sweep_interval_secs),
                shutdown.resubscribe(),
            )
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        if let Some(handle) = sweeper {
            let _ = handle.await;
        }

        tracing::info!(role = %self.role, "HTTP server stopped");
        Ok(())
    }

    pub fn role(&self) -> ServiceRole {
        self.role
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &SiteCheckConfig {
        &self.config
    }

    /// Session cache, present for the orchestrator role.
    pub fn cache(&self) -> Option<&SessionCache> {
        self.cache.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn orch_request(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/orch")
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("orch-token", token);
        }
        builder
            .body(Body::from(r#"{"URL":"example.com","Platform":"Joomla"}"#))
            .unwrap()
    }

    fn orchestrator_config() -> SiteCheckConfig {
        let mut config = SiteCheckConfig::default();
        config.auth.orch_token = "secret".into();
        config
    }

    #[test]
    fn test_default_ports() {
        assert_eq!(ServiceRole::Orchestrator.default_bind_address(), "0.0.0.0:4000");
        assert_eq!(ServiceRole::Wordpress.default_bind_address(), "0.0.0.0:4001");
        assert_eq!(ServiceRole::Regular.default_bind_address(), "0.0.0.0:4002");
    }

    #[test]
    fn test_only_orchestrator_owns_cache() {
        let server = HttpServer::new(ServiceRole::Orchestrator, SiteCheckConfig::default()).unwrap();
        assert!(server.cache().is_some());

        let server = HttpServer::new(ServiceRole::Regular, SiteCheckConfig::default()).unwrap();
        assert!(server.cache().is_none());
    }

    #[tokio::test]
    async fn test_token_checked_before_body() {
        let server = HttpServer::new(ServiceRole::Orchestrator, orchestrator_config()).unwrap();
        let response = server.router.oneshot(orch_request(Some("wrong"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key("correlation-id"));
    }

    #[tokio::test]
    async fn test_unsupported_platform_is_bad_request() {
        let server = HttpServer::new(ServiceRole::Orchestrator, orchestrator_config()).unwrap();
        let response = server.router.oneshot(orch_request(Some("secret"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_field_rejected() {
        let server = HttpServer::new(ServiceRole::Orchestrator, orchestrator_config()).unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/orch")
            .header("content-type", "application/json")
            .header("orch-token", "secret")
            .body(Body::from(r#"{"URL":"example.com","Extra":1}"#))
            .unwrap();
        let response = server.router.oneshot(request).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_healthz() {
        let server = HttpServer::new(ServiceRole::Wordpress, SiteCheckConfig::default()).unwrap();
        let request = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
        let response = server.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
