//! Upstream network-management API client
//!
//! Defines the interface the SLE engine uses to talk to the cloud controller,
//! plus the HTTP implementation against its REST API. Handlers and the engine
//! only ever see the trait, so tests substitute a scripted implementation.

use async_trait::async_trait;

use crate::models::{LegacySummary, Site, SleTrend};
use crate::sle::duration::TimeWindow;
use crate::sle::impacted::ItemType;

pub mod http;

pub use http::HttpUpstreamClient;

/// Errors from the upstream API layer.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Non-2xx response from the upstream API.
    #[error("upstream returned status {status}")]
    Status { status: u16, body: Option<String> },
    /// Network or transport failure.
    #[error("upstream request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Response body did not match the expected shape.
    #[error("failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),
    /// No organization could be resolved for the configured token.
    #[error("{0}")]
    MissingOrg(String),
    /// Client-side configuration problem, e.g. missing API token.
    #[error("{0}")]
    Config(String),
}

/// Abstraction over the upstream network-management REST API.
///
/// `window` parameters carry either a named duration or an explicit epoch
/// range; implementations translate them to the query encoding each endpoint
/// expects.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Resolve the organization ID, either from configuration or by
    /// inspecting the token's privileges.
    async fn resolve_org(&self) -> Result<String, UpstreamError>;

    /// Display name of an organization.
    async fn org_name(&self, org_id: &str) -> Result<String, UpstreamError>;

    /// All sites of the organization, paginated transparently.
    async fn list_sites(&self, org_id: &str) -> Result<Vec<Site>, UpstreamError>;

    /// Site record for a single site.
    async fn site_info(&self, site_id: &str) -> Result<Site, UpstreamError>;

    /// Names of the SLE metrics enabled on a site, version suffixes intact.
    async fn list_enabled_metrics(&self, site_id: &str) -> Result<Vec<String>, UpstreamError>;

    /// Sample trend for one metric, including per-classifier sample series.
    async fn sle_summary_trend(
        &self,
        site_id: &str,
        metric: &str,
        window: &TimeWindow,
    ) -> Result<SleTrend, UpstreamError>;

    /// Legacy summary for one metric, source of classifier impact counters.
    async fn sle_summary(
        &self,
        site_id: &str,
        metric: &str,
        window: &TimeWindow,
    ) -> Result<LegacySummary, UpstreamError>;

    /// Raw impact-summary breakdown for one metric and classifier: degraded
    /// counts grouped by AP, WLAN, device type, device OS, and band.
    async fn sle_impact_summary(
        &self,
        site_id: &str,
        metric: &str,
        classifier: &str,
        window: &TimeWindow,
    ) -> Result<serde_json::Value, UpstreamError>;

    /// Raw impacted-item listing for one metric, optionally scoped to a
    /// classifier. Returned as-is; ranking happens in the engine.
    async fn list_impacted_items(
        &self,
        site_id: &str,
        metric: &str,
        item_type: ItemType,
        classifier: Option<&str>,
        window: &TimeWindow,
    ) -> Result<serde_json::Value, UpstreamError>;

    /// Org-wide worst-sites ranking rows for one metric over an epoch range.
    async fn worst_sites_by_sle(
        &self,
        org_id: &str,
        metric: &str,
        start: i64,
        end: i64,
        limit: usize,
    ) -> Result<Vec<serde_json::Map<String, serde_json::Value>>, UpstreamError>;

    /// Device statistics rows for a site, filtered by device type
    /// (`ap`, `switch`, `gateway`).
    async fn list_device_stats(
        &self,
        site_id: &str,
        device_type: &str,
    ) -> Result<Vec<serde_json::Value>, UpstreamError>;
}
