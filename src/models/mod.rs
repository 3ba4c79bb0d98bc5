//! # Data Models
//!
//! Response and upstream payload types used throughout the SLE Dashboard API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod site;
pub mod sle;

pub use site::Site;
pub use sle::{
    CategoryDetails, CategoryResult, ClassifierImpact, ClassifierImpactDetails, ClassifierInfo,
    ImpactedElement, ImpactedItems, LegacySummary, MetricDetail, SampleSeries, SiteSle, SleTrend,
    TrendClassifier, WorstSite, WorstSitesResponse,
};

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "sle-dashboard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
