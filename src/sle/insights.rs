//! Org-wide worst-sites ranking for one category.

use std::collections::HashMap;

use crate::catalog::Category;
use crate::models::{WorstSite, WorstSitesResponse};
use crate::sle::{duration, SleService};

impl SleService {
    /// Worst sites of the organization for one category, ranked by the
    /// category's representative metric.
    ///
    /// This feeds a dashboard panel that must render something even when the
    /// upstream is unhealthy, so failures come back in the envelope with
    /// `success: false` instead of an error status.
    pub async fn worst_sites(
        &self,
        category: Category,
        duration_token: &str,
        limit: usize,
    ) -> WorstSitesResponse {
        let mut response = self
            .ranked_by(category.representative_metric(), duration_token, limit)
            .await;
        response.sle_type = Some(category.to_string());
        response
    }

    /// Worst sites ranked by one specific metric. The metric name is passed
    /// through unvalidated; the upstream knows more metrics than the catalog.
    pub async fn worst_sites_by_metric(
        &self,
        metric: &str,
        duration_token: &str,
        limit: usize,
    ) -> WorstSitesResponse {
        let mut response = self.ranked_by(metric, duration_token, limit).await;
        response.metric = Some(metric.to_string());
        response
    }

    async fn ranked_by(&self, metric: &str, duration_token: &str, limit: usize) -> WorstSitesResponse {
        let (start, end) = duration::insight_range(duration_token);

        let org_id = match self.upstream().resolve_org().await {
            Ok(org_id) => org_id,
            Err(error) => return failure(duration_token, error.to_string()),
        };

        let rows = match self
            .upstream()
            .worst_sites_by_sle(&org_id, metric, start, end, limit)
            .await
        {
            Ok(rows) => rows,
            Err(error) => {
                tracing::warn!(metric, %error, "worst-sites fetch failed");
                return failure(duration_token, error.to_string());
            }
        };

        // A missing name map degrades to "Unknown Site" rather than failing
        // the whole ranking.
        let names = match self.upstream().list_sites(&org_id).await {
            Ok(sites) => sites.into_iter().map(|s| (s.id, s.name)).collect(),
            Err(error) => {
                tracing::warn!(%error, "site name map fetch failed");
                HashMap::new()
            }
        };

        WorstSitesResponse {
            success: true,
            sle_type: None,
            metric: None,
            duration: duration_token.to_string(),
            sites: annotate(rows, &names, limit),
            error: None,
        }
    }
}

fn failure(duration_token: &str, error: String) -> WorstSitesResponse {
    WorstSitesResponse {
        success: false,
        sle_type: None,
        metric: None,
        duration: duration_token.to_string(),
        sites: Vec::new(),
        error: Some(error),
    }
}

/// Attach resolved site names and enforce the limit client-side; the
/// upstream does not always honor its `limit` parameter.
fn annotate(
    rows: Vec<serde_json::Map<String, serde_json::Value>>,
    names: &HashMap<String, String>,
    limit: usize,
) -> Vec<WorstSite> {
    rows.into_iter()
        .take(limit)
        .map(|mut row| {
            let site_id = row
                .remove("site_id")
                .and_then(|v| v.as_str().map(str::to_string));
            let site_name = site_id
                .as_deref()
                .and_then(|id| names.get(id))
                .cloned()
                .unwrap_or_else(|| "Unknown Site".to_string());
            WorstSite {
                site_id,
                site_name,
                metrics: row,
            }
        })
        .collect()
}
