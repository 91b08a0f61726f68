//! Capability services: the downstream ends of the orchestrator.
//!
//! # Data Flow
//! ```text
//! POST /wordpress {URL, Check}
//!     → wordpress.rs (plugin, config, user; fixed emit order)
//!         plugin → plugins.rs → version_scan.rs (one lookup per plugin)
//!     → combined body
//!
//! POST /regular {URL}
//!     → regular.rs (GET site root) → "<URL>: OK" | "Status Code Not OK"
//! ```

pub mod plugins;
pub mod regular;
pub mod types;
pub mod version_scan;
pub mod wordpress;

pub use regular::{ProbeOutcome, ReachabilityProbe};
pub use types::{CapabilityError, CapabilityResult, PluginReport, SitePlugin};
pub use wordpress::{SiteSession, WordpressService};
