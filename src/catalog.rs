//! Metric catalog: which SLE metrics exist, which dashboard category each
//! belongs to, and how versioned metric names collapse to display names.
//!
//! The upstream API reports enabled metrics by name only; category membership
//! and display naming are dashboard-side concerns kept in this static table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// SLE metric names that belong to the WiFi category.
pub const WIFI_METRICS: &[&str] = &[
    "coverage",
    "capacity",
    "time-to-connect",
    "roaming",
    "throughput",
    "ap-availability",
    "ap-health",
];

/// SLE metric names that belong to the Wired category.
pub const WIRED_METRICS: &[&str] = &["switch-health", "switch-throughput", "switch-stc"];

/// SLE metric names that belong to the WAN category.
pub const WAN_METRICS: &[&str] = &[
    "gateway-health",
    "wan-link-health",
    "application-health",
    "gateway-bandwidth",
];

/// Version suffixes the upstream appends to evolved metrics. Stripped for
/// display so `switch-health` and `switch-health-v2` collapse to one name.
const VERSION_SUFFIXES: &[&str] = &["-v2", "-v4", "-new"];

/// Dashboard category an SLE metric belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Wifi,
    Wired,
    Wan,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Wifi, Category::Wired, Category::Wan];

    /// Base metric names belonging to this category.
    pub fn metrics(self) -> &'static [&'static str] {
        match self {
            Category::Wifi => WIFI_METRICS,
            Category::Wired => WIRED_METRICS,
            Category::Wan => WAN_METRICS,
        }
    }

    /// Representative metric used for org-wide worst-site ranking. The
    /// ranking endpoint accepts a single metric key and returns all sibling
    /// metrics of its category alongside it.
    pub fn representative_metric(self) -> &'static str {
        match self {
            Category::Wifi => "ap-availability",
            // switch-health can return zero rows on some org generations
            Category::Wired => "switch-stc",
            Category::Wan => "gateway-health",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Wifi => "wifi",
            Category::Wired => "wired",
            Category::Wan => "wan",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unknown category tokens, naming the allowed set.
#[derive(Debug, thiserror::Error)]
#[error("invalid category '{0}': must be one of wifi, wired, wan")]
pub struct InvalidCategory(pub String);

impl FromStr for Category {
    type Err = InvalidCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wifi" => Ok(Category::Wifi),
            "wired" => Ok(Category::Wired),
            "wan" => Ok(Category::Wan),
            other => Err(InvalidCategory(other.to_string())),
        }
    }
}

/// Resolve the category of an enabled metric by exact or prefix match
/// (`switch-health-v2` matches the `switch-health` catalog entry). Returns
/// `None` for metrics outside the catalog; callers skip those.
pub fn category_of(metric: &str) -> Option<Category> {
    for category in Category::ALL {
        if category
            .metrics()
            .iter()
            .any(|m| metric == *m || metric.starts_with(m))
        {
            return Some(category);
        }
    }
    None
}

/// Collapse a (possibly versioned) metric name to its display name.
pub fn display_name(metric: &str) -> String {
    let mut name = metric.to_string();
    for suffix in VERSION_SUFFIXES {
        name = name.replace(suffix, "");
    }
    name
}
