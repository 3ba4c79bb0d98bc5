//! Per-category classifier breakdown: merges the trend endpoint's sample
//! series with the legacy summary endpoint's impact counters.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::catalog::{self, Category};
use crate::models::{CategoryDetails, ClassifierInfo, LegacySummary, MetricDetail, SleTrend};
use crate::sle::{duration, SleService};
use crate::upstream::UpstreamError;

impl SleService {
    /// Classifier breakdown for every enabled metric of one category.
    ///
    /// Each metric needs two upstream fetches: the trend endpoint carries
    /// sample series per classifier, the legacy summary carries device and
    /// user impact counters. When either fetch fails the metric stays in the
    /// response with a null score and no classifiers.
    pub async fn category_details(
        &self,
        site_id: &str,
        category: Category,
        duration_token: &str,
    ) -> Result<CategoryDetails, UpstreamError> {
        let window = duration::resolve(duration_token);
        let enabled = match self.upstream().list_enabled_metrics(site_id).await {
            Ok(enabled) => enabled,
            Err(error) => {
                tracing::warn!(site_id, %error, "enabled metrics fetch failed");
                Vec::new()
            }
        };

        let mut metrics: BTreeMap<String, MetricDetail> = BTreeMap::new();
        for metric in enabled
            .iter()
            .filter(|m| catalog::category_of(m) == Some(category))
        {
            let name = catalog::display_name(metric);
            let detail = match self.fetch_metric_detail(site_id, metric, &name, &window).await {
                Ok(detail) => detail,
                Err(error) => {
                    tracing::warn!(site_id, metric, %error, "metric detail fetch failed");
                    MetricDetail {
                        name: name.clone(),
                        ..MetricDetail::default()
                    }
                }
            };
            metrics.entry(name).or_insert(detail);
        }

        Ok(CategoryDetails {
            category: category.to_string(),
            duration: duration_token.to_string(),
            metrics,
        })
    }

    async fn fetch_metric_detail(
        &self,
        site_id: &str,
        metric: &str,
        name: &str,
        window: &duration::TimeWindow,
    ) -> Result<MetricDetail, UpstreamError> {
        let trend = self
            .upstream()
            .sle_summary_trend(site_id, metric, window)
            .await?;
        // Only the legacy endpoint carries per-classifier impact counters.
        // Losing it costs the counters, not the whole metric.
        let summary = match self.upstream().sle_summary(site_id, metric, window).await {
            Ok(summary) => summary,
            Err(error) => {
                tracing::debug!(site_id, metric, %error, "legacy summary unavailable");
                LegacySummary::default()
            }
        };
        Ok(merge_metric(name, &trend, &summary))
    }
}

/// Build one metric's detail from its two upstream responses.
///
/// Classifiers with no degraded samples in the window are dropped. Each
/// surviving classifier's percentage is its share of the metric's total
/// classifier-attributed degradation. The metric-level impact block from
/// the trend response is carried through unchanged.
pub(crate) fn merge_metric(name: &str, trend: &SleTrend, summary: &LegacySummary) -> MetricDetail {
    let impact_by_name: BTreeMap<&str, _> = summary
        .classifiers
        .iter()
        .map(|c| (c.name.as_str(), &c.impact))
        .collect();

    let degraded: Vec<(&crate::models::TrendClassifier, f64)> = trend
        .classifiers
        .iter()
        .map(|c| (c, c.samples.degraded_sum()))
        .filter(|(_, sum)| *sum > 0.0)
        .collect();
    let total_degraded: f64 = degraded.iter().map(|(_, sum)| sum).sum();

    let mut classifiers: Vec<ClassifierInfo> = degraded
        .into_iter()
        .map(|(classifier, degraded_sum)| ClassifierInfo {
            name: classifier.name.clone(),
            degraded_sum,
            percentage: if total_degraded > 0.0 {
                round1(degraded_sum / total_degraded * 100.0)
            } else {
                0.0
            },
            impact: impact_by_name
                .get(classifier.name.as_str())
                .map(|i| (*i).clone())
                .unwrap_or_default(),
            samples: classifier.samples.degraded.clone(),
        })
        .collect();
    classifiers.sort_by(|a, b| {
        b.percentage
            .partial_cmp(&a.percentage)
            .unwrap_or(Ordering::Equal)
    });

    MetricDetail {
        name: name.to_string(),
        sle_value: trend.sle.samples.score(),
        classifiers,
        impact: trend.impact.clone(),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClassifierImpact;

    fn trend(json: serde_json::Value) -> SleTrend {
        serde_json::from_value(json).unwrap()
    }

    fn summary(json: serde_json::Value) -> LegacySummary {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn zero_degraded_classifiers_are_dropped() {
        let t = trend(serde_json::json!({
            "sle": {"samples": {"total": [100.0], "degraded": [10.0]}},
            "classifiers": [
                {"name": "interference", "samples": {"degraded": [6.0]}},
                {"name": "weak-signal", "samples": {"degraded": [0.0, null]}},
                {"name": "asymmetry", "samples": {"degraded": [4.0]}}
            ]
        }));
        let detail = merge_metric("coverage", &t, &summary(serde_json::json!({})));
        let names: Vec<&str> = detail.classifiers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["interference", "asymmetry"]);
    }

    #[test]
    fn percentages_split_total_degradation_and_sort_descending() {
        let t = trend(serde_json::json!({
            "sle": {"samples": {"total": [100.0], "degraded": [10.0]}},
            "classifiers": [
                {"name": "a", "samples": {"degraded": [1.0]}},
                {"name": "b", "samples": {"degraded": [3.0]}}
            ]
        }));
        let detail = merge_metric("coverage", &t, &summary(serde_json::json!({})));
        assert_eq!(detail.classifiers[0].name, "b");
        assert_eq!(detail.classifiers[0].percentage, 75.0);
        assert_eq!(detail.classifiers[1].percentage, 25.0);
        let total: f64 = detail.classifiers.iter().map(|c| c.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn impact_counters_join_by_classifier_name() {
        let t = trend(serde_json::json!({
            "sle": {"samples": {"total": [50.0], "degraded": [5.0]}},
            "classifiers": [
                {"name": "dhcp", "samples": {"degraded": [5.0]}}
            ]
        }));
        let s = summary(serde_json::json!({
            "classifiers": [
                {"name": "dhcp", "impact": {"num_users": 12, "total_users": 40}},
                {"name": "arp", "impact": {"num_users": 2}}
            ]
        }));
        let detail = merge_metric("time-to-connect", &t, &s);
        assert_eq!(detail.classifiers[0].impact.num_users, 12);
        assert_eq!(detail.classifiers[0].impact.total_users, 40);
    }

    #[test]
    fn missing_impact_defaults_to_empty_counters() {
        let t = trend(serde_json::json!({
            "sle": {"samples": {"total": [50.0], "degraded": [5.0]}},
            "classifiers": [{"name": "dns", "samples": {"degraded": [2.0]}}]
        }));
        let detail = merge_metric("time-to-connect", &t, &summary(serde_json::json!({})));
        assert_eq!(detail.classifiers[0].impact, ClassifierImpact::default());
    }

    #[test]
    fn metric_level_impact_and_name_are_carried() {
        let t = trend(serde_json::json!({
            "sle": {"samples": {"total": [100.0], "degraded": [10.0]}},
            "classifiers": [],
            "impact": {"num_aps": 2, "total_aps": 9}
        }));
        let detail = merge_metric("coverage", &t, &summary(serde_json::json!({})));
        assert_eq!(detail.name, "coverage");
        assert_eq!(detail.impact.get("num_aps").and_then(|v| v.as_i64()), Some(2));

        let bare = merge_metric("roaming", &trend(serde_json::json!({})), &summary(serde_json::json!({})));
        assert_eq!(bare.name, "roaming");
        assert!(bare.impact.is_empty());
    }

    #[test]
    fn score_excluded_without_traffic() {
        let t = trend(serde_json::json!({
            "sle": {"samples": {"total": [null, 0.0], "degraded": []}},
            "classifiers": []
        }));
        let detail = merge_metric("throughput", &t, &summary(serde_json::json!({})));
        assert_eq!(detail.sle_value, None);
    }
}
