//! SLE payload types: upstream trend/summary shapes and the aggregated
//! responses the dashboard serves.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Parallel sample arrays from a summary-trend response. Entries may be null
/// when the upstream has a gap for that interval; null slots are excluded
/// from sums rather than treated as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SampleSeries {
    #[serde(default)]
    pub total: Vec<Option<f64>>,
    #[serde(default)]
    pub degraded: Vec<Option<f64>>,
}

impl SampleSeries {
    pub fn total_sum(&self) -> f64 {
        self.total.iter().flatten().sum()
    }

    pub fn degraded_sum(&self) -> f64 {
        self.degraded.iter().flatten().sum()
    }

    /// SLE score as a percentage rounded to one decimal place, or `None`
    /// when no traffic was observed in the window.
    pub fn score(&self) -> Option<f64> {
        let total = self.total_sum();
        if total == 0.0 {
            return None;
        }
        let raw = (total - self.degraded_sum()) / total * 100.0;
        Some((raw * 10.0).round() / 10.0)
    }
}

/// The `sle` block of a summary-trend response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrendSle {
    #[serde(default)]
    pub samples: SampleSeries,
}

/// One classifier entry from a summary-trend response.
#[derive(Debug, Clone, Deserialize)]
pub struct TrendClassifier {
    pub name: String,
    #[serde(default)]
    pub samples: ClassifierSamples,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassifierSamples {
    #[serde(default)]
    pub degraded: Vec<Option<f64>>,
}

impl ClassifierSamples {
    pub fn degraded_sum(&self) -> f64 {
        self.degraded.iter().flatten().sum()
    }
}

/// Upstream summary-trend response for one metric.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SleTrend {
    #[serde(default)]
    pub sle: TrendSle,
    #[serde(default)]
    pub classifiers: Vec<TrendClassifier>,
    /// Metric-level impact block, passed through verbatim.
    #[serde(default)]
    pub impact: serde_json::Map<String, serde_json::Value>,
}

/// Device and user counts attached to a classifier by the legacy summary
/// endpoint. Which counters carry data depends on the metric's category;
/// the rest stay at zero, and all eight are always serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClassifierImpact {
    #[serde(default)]
    pub num_aps: i64,
    #[serde(default)]
    pub total_aps: i64,
    #[serde(default)]
    pub num_switches: i64,
    #[serde(default)]
    pub total_switches: i64,
    #[serde(default)]
    pub num_gateways: i64,
    #[serde(default)]
    pub total_gateways: i64,
    #[serde(default)]
    pub num_users: i64,
    #[serde(default)]
    pub total_users: i64,
}

impl ClassifierImpact {
    /// Count of impacted items, whichever device counter carries data.
    pub fn impact_count(&self) -> Option<i64> {
        [
            self.num_aps,
            self.num_switches,
            self.num_gateways,
            self.num_users,
        ]
        .into_iter()
        .find(|count| *count > 0)
    }
}

/// One classifier from the legacy summary endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyClassifier {
    pub name: String,
    #[serde(default)]
    pub impact: ClassifierImpact,
}

/// Upstream legacy summary response for one metric.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacySummary {
    #[serde(default)]
    pub classifiers: Vec<LegacyClassifier>,
}

/// Aggregated scores for one category of a site.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CategoryResult {
    /// Display-name keyed SLE scores. Metrics with no observed traffic in
    /// the window are absent rather than zero.
    pub metrics: BTreeMap<String, f64>,
    /// Whether any metric of this category reported data in the window.
    pub available: bool,
}

/// Site-wide SLE rollup across all three categories.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SiteSle {
    pub wifi: CategoryResult,
    pub wired: CategoryResult,
    pub wan: CategoryResult,
}

/// One classifier in a category detail response, merged from the trend and
/// legacy summary endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassifierInfo {
    pub name: String,
    pub degraded_sum: f64,
    /// Share of this metric's degraded traffic attributed to the classifier.
    pub percentage: f64,
    #[serde(default)]
    pub impact: ClassifierImpact,
    /// Per-interval degraded samples, nulls preserved for charting gaps.
    #[serde(default)]
    pub samples: Vec<Option<f64>>,
}

/// Detail for one metric: its score, ranked classifier breakdown, and the
/// metric-level impact block from the trend response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct MetricDetail {
    pub name: String,
    pub sle_value: Option<f64>,
    #[serde(default)]
    pub classifiers: Vec<ClassifierInfo>,
    /// Metric-level impact counters as reported upstream; empty when the
    /// trend fetch failed or carried none.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub impact: serde_json::Map<String, serde_json::Value>,
}

/// Detail response for one category of a site.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryDetails {
    pub category: String,
    pub duration: String,
    pub metrics: BTreeMap<String, MetricDetail>,
}

/// One network element in a classifier impact breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ImpactedElement {
    pub name: String,
    /// Stable identifier when the upstream carries one (AP MAC, WLAN ID).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub degraded: i64,
    pub total: i64,
}

/// Root-cause breakdown for one metric/classifier pair: which elements carry
/// the degradation, grouped by dimension and sorted worst first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ClassifierImpactDetails {
    pub metric: String,
    pub classifier: String,
    pub aps: Vec<ImpactedElement>,
    pub wlans: Vec<ImpactedElement>,
    pub device_types: Vec<ImpactedElement>,
    pub device_os: Vec<ImpactedElement>,
    pub bands: Vec<ImpactedElement>,
}

/// Ranked impacted items for one metric (optionally one classifier).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImpactedItems {
    pub metric: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    pub total_count: u64,
    /// Raw upstream item objects with `failure_rate` and `overall_impact`
    /// percentages added.
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<serde_json::Value>,
}

/// One row of the org-wide worst-sites ranking, raw upstream metric columns
/// preserved alongside the resolved site name.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorstSite {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    pub site_name: String,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub metrics: serde_json::Map<String, serde_json::Value>,
}

/// Envelope for the worst-sites ranking. Upstream failures are reported in
/// the envelope rather than surfaced as an error status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorstSitesResponse {
    pub success: bool,
    /// Category tag when ranked by a category's representative metric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sle_type: Option<String>,
    /// Metric tag when ranked by an explicit metric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    pub duration: String,
    pub sites: Vec<WorstSite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(total: &[Option<f64>], degraded: &[Option<f64>]) -> SampleSeries {
        SampleSeries {
            total: total.to_vec(),
            degraded: degraded.to_vec(),
        }
    }

    #[test]
    fn score_ignores_null_gaps() {
        let s = series(
            &[Some(100.0), None, Some(20.0)],
            &[Some(10.0), Some(999.0), None],
        );
        // each array is summed on its own, nulls excluded per array
        assert_eq!(s.total_sum(), 120.0);
        assert_eq!(s.degraded_sum(), 1009.0);
    }

    #[test]
    fn score_rounds_to_one_decimal() {
        let s = series(&[Some(60.0)], &[Some(10.0)]);
        // (60 - 10) / 60 * 100 = 83.333...
        assert_eq!(s.score(), Some(83.3));
    }

    #[test]
    fn score_is_none_without_traffic() {
        let s = series(&[None, Some(0.0)], &[Some(5.0)]);
        assert_eq!(s.score(), None);
        assert_eq!(SampleSeries::default().score(), None);
    }

    #[test]
    fn trend_deserializes_with_missing_blocks() {
        let trend: SleTrend = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(trend.classifiers.is_empty());
        assert!(trend.impact.is_empty());
        assert_eq!(trend.sle.samples.total_sum(), 0.0);
    }

    #[test]
    fn trend_keeps_metric_level_impact() {
        let trend: SleTrend = serde_json::from_value(serde_json::json!({
            "impact": {"num_aps": 2, "total_aps": 9}
        }))
        .unwrap();
        assert_eq!(trend.impact.get("num_aps").and_then(|v| v.as_i64()), Some(2));
    }

    #[test]
    fn impact_serializes_all_counters() {
        let json = serde_json::to_value(ClassifierImpact::default()).unwrap();
        let counters = json.as_object().unwrap();
        assert_eq!(counters.len(), 8);
        assert_eq!(counters.get("total_users"), Some(&serde_json::json!(0)));
    }

    #[test]
    fn impact_count_prefers_populated_counter() {
        let impact = ClassifierImpact {
            num_switches: 3,
            total_switches: 10,
            ..Default::default()
        };
        assert_eq!(impact.impact_count(), Some(3));
        assert_eq!(ClassifierImpact::default().impact_count(), None);
    }

    #[test]
    fn worst_site_keeps_metric_columns() {
        let raw = serde_json::json!({
            "site_id": "s-1",
            "site_name": "HQ",
            "ap-availability": 97.2,
            "coverage": 88.0
        });
        let row: WorstSite = serde_json::from_value(raw).unwrap();
        assert_eq!(row.metrics.get("coverage").unwrap().as_f64(), Some(88.0));
        let back = serde_json::to_value(&row).unwrap();
        assert_eq!(back["ap-availability"].as_f64(), Some(97.2));
    }
}
