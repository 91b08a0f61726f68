//! Shared utilities for integration testing.

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use site_orchestrator::config::SiteCheckConfig;
use site_orchestrator::{HttpServer, ServiceRole, Shutdown};

pub const ORCH_TOKEN: &str = "public-token";
pub const INTERNAL_TOKEN: &str = "internal-token";

/// A request seen by a mock backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

pub type Log = Arc<Mutex<Vec<Recorded>>>;

#[derive(Clone)]
struct MockState {
    log: Log,
    routes: Arc<Vec<(String, u16, Bytes)>>,
    delay: Duration,
}

async fn mock_handler(
    State(state): State<MockState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let path = uri
        .path_and_query()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default();
    state.log.lock().unwrap().push(Recorded {
        path: path.clone(),
        headers,
        body,
    });
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    for (prefix, status, reply) in state.routes.iter() {
        if path.starts_with(prefix.as_str()) {
            return (StatusCode::from_u16(*status).unwrap(), reply.clone());
        }
    }
    (StatusCode::NOT_FOUND, Bytes::from_static(b"not found"))
}

/// Start a mock backend answering path prefixes with fixed replies.
/// The first matching prefix wins.
pub async fn start_mock_backend(routes: Vec<(&str, u16, &str)>) -> (SocketAddr, Log) {
    start_delayed_backend(routes, Duration::ZERO).await
}

/// Like [`start_mock_backend`], but every reply is held back by `delay`.
/// Requests are recorded on arrival.
pub async fn start_delayed_backend(routes: Vec<(&str, u16, &str)>, delay: Duration) -> (SocketAddr, Log) {
    let log: Log = Arc::default();
    let state = MockState {
        log: log.clone(),
        routes: Arc::new(
            routes
                .into_iter()
                .map(|(p, s, b)| (p.to_string(), s, Bytes::from(b.to_string())))
                .collect(),
        ),
        delay,
    };
    let app = Router::new()
        .route("/", any(mock_handler))
        .route("/{*path}", any(mock_handler))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, log)
}

/// Config with known tokens and plain-HTTP site access.
pub fn test_config() -> SiteCheckConfig {
    let mut config = SiteCheckConfig::default();
    config.auth.orch_token = ORCH_TOKEN.into();
    config.auth.internal_token = INTERNAL_TOKEN.into();
    config.sites.scheme = "http".into();
    config.sites.timeout_secs = 5;
    config.downstream.timeout_secs = 5;
    config
}

/// Run `role` on an ephemeral port. Dropping the returned `Shutdown` does
/// not stop it; call `trigger`.
pub async fn start_service(role: ServiceRole, config: SiteCheckConfig) -> (SocketAddr, Shutdown) {
    let shutdown = Shutdown::new();
    let server = HttpServer::new(role, config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
