//! Site-wide SLE rollup: one score per display-name metric, grouped into
//! wifi/wired/wan categories.

use crate::catalog::{self, Category};
use crate::models::{CategoryResult, SiteSle};
use crate::sle::{duration, SleService};
use crate::upstream::UpstreamError;

impl SleService {
    /// Scores for every enabled, cataloged metric on a site.
    ///
    /// Metrics outside the catalog are skipped. A metric with no observed
    /// traffic in the window is omitted from its category's map rather than
    /// reported as zero. Versioned metric variants collapse onto one display
    /// name, first fetched wins. A failed fetch, whether of the metric list
    /// or of one metric's trend, is logged and does not fail the rollup.
    pub async fn site_sle(&self, site_id: &str, duration: &str) -> Result<SiteSle, UpstreamError> {
        let window = duration::resolve(duration);
        let metrics = match self.upstream().list_enabled_metrics(site_id).await {
            Ok(metrics) => metrics,
            Err(error) => {
                tracing::warn!(site_id, %error, "enabled metrics fetch failed");
                Vec::new()
            }
        };

        let mut result = SiteSle::default();
        for metric in &metrics {
            let Some(category) = catalog::category_of(metric) else {
                tracing::debug!(metric, "skipping metric outside catalog");
                continue;
            };
            let score = match self
                .upstream()
                .sle_summary_trend(site_id, metric, &window)
                .await
            {
                Ok(trend) => trend.sle.samples.score(),
                Err(error) => {
                    tracing::warn!(site_id, metric, %error, "metric trend fetch failed");
                    None
                }
            };
            insert_metric(category_slot(&mut result, category), metric, score);
        }
        Ok(result)
    }
}

fn category_slot(sle: &mut SiteSle, category: Category) -> &mut CategoryResult {
    match category {
        Category::Wifi => &mut sle.wifi,
        Category::Wired => &mut sle.wired,
        Category::Wan => &mut sle.wan,
    }
}

/// Record one metric in its category. Only a metric with observed traffic
/// marks the category available; the score map takes the first value seen
/// per display name.
fn insert_metric(slot: &mut CategoryResult, metric: &str, score: Option<f64>) {
    if let Some(value) = score {
        slot.available = true;
        slot.metrics
            .entry(catalog::display_name(metric))
            .or_insert(value);
    }
}
