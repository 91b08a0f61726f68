//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (correlation ID, session headers)
//!     → middleware/auth.rs (Orch-Token)
//!     → handlers.rs (orchestrator | wordpress | regular)
//!     → response.rs (status mapping, content type)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{CORRELATION_ID, ORCH_TOKEN, WP_NONCE};
pub use server::{HttpServer, ServiceRole};
