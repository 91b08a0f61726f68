//! Check request model and name canonicalization.
//!
//! # Data Flow
//! ```text
//! JSON body {URL, Platform, Check}
//!     → request.rs (decode, strip host)
//!     → normalize.rs (platform + check vocabulary)
//!     → NormalizedRequest (consumed by the dispatcher)
//! ```

pub mod normalize;
pub mod request;

pub use normalize::{CheckKind, NormalizedCheck, Platform};
pub use request::{CheckRequest, NormalizedRequest};
