//! Check dispatch: serve from cache or forward downstream.
//!
//! # Rules
//! - Non-WordPress requests always go to `regular`; the cache is not consulted
//! - WordPress checks already cached for the nonce are removed from the
//!   forwarded list and their fragments collected in request order
//! - If nothing is left to forward the request is downgraded to `regular`,
//!   a reachability probe, rather than skipped

use crate::cache::{SessionCache, SessionNonce};
use crate::check::{NormalizedRequest, Platform};
use crate::orchestrator::types::Dispatch;

/// Decide where `request` goes and which fragments come from cache.
pub fn dispatch(request: &NormalizedRequest, nonce: &SessionNonce, cache: &SessionCache) -> Dispatch {
    if request.platform != Platform::Wordpress {
        return Dispatch {
            platform: Platform::Regular,
            forward: request.checks.clone(),
            cached: Vec::new(),
        };
    }

    let mut forward = Vec::with_capacity(request.checks.len());
    let mut cached = Vec::new();
    for &kind in &request.checks {
        match cache.get(nonce, kind) {
            Some(fragment) => cached.push((kind, fragment)),
            None => forward.push(kind),
        }
    }

    if forward.is_empty() {
        tracing::debug!(
            cached = cached.len(),
            "Nothing left to forward, downgrading to reachability probe"
        );
        return Dispatch {
            platform: Platform::Regular,
            forward,
            cached,
        };
    }

    Dispatch {
        platform: Platform::Wordpress,
        forward,
        cached,
    }
}
