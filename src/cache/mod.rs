//! Session check cache.
//!
//! # Data Flow
//! ```text
//! Dispatcher ── get(nonce, kind) ──▶ SessionCache ◀── put(nonce, kind, bytes) ── Demultiplexer
//!                                        ▲
//!                         sweeper task (every sweep_interval_secs)
//! ```
//!
//! # Design Decisions
//! - One instance per orchestrator process, shared via `Arc`
//! - In-memory only; a restart starts cold
//! - Writes never fail; a miss is always an acceptable fallback

pub mod session;

pub use session::{SessionCache, SessionNonce};
