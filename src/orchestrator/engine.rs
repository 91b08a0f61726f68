//! Request orchestration: normalize, dispatch, forward, demultiplex, merge.

use bytes::Bytes;

use crate::cache::SessionCache;
use crate::check::{CheckRequest, Platform};
use crate::downstream::{DownstreamClient, ForwardContext};
use crate::orchestrator::demux::{commit, demux};
use crate::orchestrator::dispatch::dispatch;
use crate::orchestrator::merge::{invalid_check_report, merge};
use crate::orchestrator::types::{OrchestratedResponse, OrchestratorResult};

/// Routes site check requests, serving cached segments where it can.
pub struct Orchestrator {
    cache: SessionCache,
    downstream: DownstreamClient,
}

impl Orchestrator {
    pub fn new(cache: SessionCache, downstream: DownstreamClient) -> Self {
        Self { cache, downstream }
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    /// Handle one inbound request end to end.
    pub async fn handle(
        &self,
        request: &CheckRequest,
        ctx: &ForwardContext,
    ) -> OrchestratorResult<OrchestratedResponse> {
        let normalized = request.normalize()?;
        for token in &normalized.invalid {
            tracing::info!(correlation_id = %ctx.correlation_id, check = %token, "Incorrect check");
        }

        let plan = dispatch(&normalized, &ctx.nonce, &self.cache);
        tracing::info!(
            correlation_id = %ctx.correlation_id,
            target = %normalized.target_host,
            platform = %plan.platform,
            forwarded = ?plan.forward,
            cached = plan.cached.len(),
            downgraded = plan.is_downgraded(),
            "Dispatching request"
        );

        let body = CheckRequest::forward(&normalized.target_host, plan.platform, &plan.forward);
        let fresh = self.downstream.forward(plan.platform, &body, ctx).await?;

        if plan.platform == Platform::Wordpress {
            if fresh.status.is_success() {
                let demuxed = demux(&fresh.body, &plan.forward);
                commit(&self.cache, &ctx.nonce, &demuxed);
            } else {
                tracing::warn!(
                    correlation_id = %ctx.correlation_id,
                    status = %fresh.status,
                    "Downstream answered with an error status, nothing cached"
                );
            }
        }

        let merged = merge(&plan.cached_fragments(), &fresh.body);
        let report = invalid_check_report(&normalized.invalid);
        let body: Bytes = if report.is_empty() {
            merged
        } else {
            merge(&[report], &merged)
        };

        Ok(OrchestratedResponse {
            status: fresh.status.as_u16(),
            body,
        })
    }
}
