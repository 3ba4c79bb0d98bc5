//! Site records as exposed by the dashboard.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A site within the organization.
///
/// Upstream returns many more fields per site; only the ones the dashboard
/// surfaces are modelled, the rest are dropped on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Site {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}
