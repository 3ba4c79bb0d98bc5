//! # SLE Engine
//!
//! Aggregation and classifier-impact logic on top of the upstream client:
//! site-wide score rollups, per-category classifier breakdowns, per-classifier
//! root-cause breakdowns, impacted-item ranking, org-wide worst-site insights,
//! and CSV export.

use std::sync::Arc;

use crate::upstream::UpstreamClient;

pub mod aggregator;
pub mod details;
pub mod duration;
pub mod export;
pub mod impact;
pub mod impacted;
pub mod insights;

/// Stateless engine over an injected upstream client. Each operation lives
/// in its own submodule; this type just carries the client handle.
#[derive(Clone)]
pub struct SleService {
    upstream: Arc<dyn UpstreamClient>,
}

impl SleService {
    pub fn new(upstream: Arc<dyn UpstreamClient>) -> Self {
        Self { upstream }
    }

    pub fn upstream(&self) -> &Arc<dyn UpstreamClient> {
        &self.upstream
    }
}
