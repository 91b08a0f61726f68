//! Orchestrator subsystem.
//!
//! # Data Flow
//! ```text
//! CheckRequest
//!     → check::normalize (platform, kinds, host)
//!     → dispatch.rs (cache hits vs. forward list, downgrade)
//!     → downstream client (POST /wordpress | /regular)
//!     → demux.rs (positional split, cache commit)
//!     → merge.rs (cached fragments ++ fresh body)
//!     → OrchestratedResponse
//! ```

pub mod demux;
pub mod dispatch;
pub mod engine;
pub mod merge;
pub mod types;

pub use engine::Orchestrator;
pub use types::{Dispatch, OrchestratedResponse, OrchestratorError, OrchestratorResult};
