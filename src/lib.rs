//! Site check orchestrator library.
//!
//! One orchestrator fronts two capability services. Callers ask for checks
//! against a site; the orchestrator serves what it can from a per-session
//! cache and forwards the rest.

// Request model
pub mod check;

// Orchestrator role
pub mod cache;
pub mod downstream;
pub mod orchestrator;

// Capability roles
pub mod capability;

// Cross-cutting concerns
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::SiteCheckConfig;
pub use http::{HttpServer, ServiceRole};
pub use lifecycle::Shutdown;
