//! HTTP implementation of the upstream client against the controller's
//! REST API.

use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::OnceCell;
use url::Url;

use crate::config::AppConfig;
use crate::models::{LegacySummary, Site, SleTrend};
use crate::sle::duration::TimeWindow;
use crate::sle::impacted::ItemType;
use crate::upstream::{UpstreamClient, UpstreamError};

/// Page size for paginated org listings.
const PAGE_LIMIT: usize = 1000;

/// Upstream client over reqwest. Cheap to clone via the inner client; the
/// resolved org ID is cached for the process lifetime.
pub struct HttpUpstreamClient {
    http: reqwest::Client,
    base_url: Url,
    api_token: Option<String>,
    org_override: Option<String>,
    org_cache: OnceCell<String>,
}

impl HttpUpstreamClient {
    pub fn from_config(config: &AppConfig) -> Result<Self, UpstreamError> {
        let base_url = Url::parse(&config.upstream_base_url)
            .map_err(|e| UpstreamError::Config(format!("invalid upstream base URL: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url,
            api_token: config.upstream_api_token.clone(),
            org_override: config.upstream_org_id.clone(),
            org_cache: OnceCell::new(),
        })
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("/api/v1/{path}"));
        url
    }

    async fn get_value(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, UpstreamError> {
        let token = self.api_token.as_deref().ok_or_else(|| {
            UpstreamError::Config("no API token configured for the upstream".to_string())
        })?;

        let mut url = self.endpoint(path);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        counter!("upstream_requests_total").increment(1);
        let response = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, format!("Token {token}"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            counter!("upstream_request_errors_total").increment(1);
            let body = response.text().await.ok();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let value = self.get_value(path, query).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn detect_org(&self) -> Result<String, UpstreamError> {
        let me: Value = self.get_value("self", &[]).await?;
        me.get("privileges")
            .and_then(Value::as_array)
            .and_then(|privileges| {
                privileges
                    .iter()
                    .find_map(|p| p.get("org_id").and_then(Value::as_str))
            })
            .map(str::to_string)
            .ok_or_else(|| {
                UpstreamError::MissingOrg(
                    "could not determine organization from token privileges".to_string(),
                )
            })
    }
}

/// Ranking endpoints return either a bare list or a `{"results": [...]}`
/// wrapper depending on controller generation.
fn unwrap_results(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn resolve_org(&self) -> Result<String, UpstreamError> {
        if let Some(org_id) = &self.org_override {
            return Ok(org_id.clone());
        }
        self.org_cache
            .get_or_try_init(|| self.detect_org())
            .await
            .cloned()
    }

    async fn org_name(&self, org_id: &str) -> Result<String, UpstreamError> {
        let org: Value = self.get_value(&format!("orgs/{org_id}"), &[]).await?;
        Ok(org
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string())
    }

    async fn list_sites(&self, org_id: &str) -> Result<Vec<Site>, UpstreamError> {
        let mut sites = Vec::new();
        let mut page = 1usize;
        loop {
            let batch: Vec<Site> = self
                .get_json(
                    &format!("orgs/{org_id}/sites"),
                    &[
                        ("limit", PAGE_LIMIT.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?;
            let full_page = batch.len() == PAGE_LIMIT;
            sites.extend(batch);
            if !full_page {
                break;
            }
            page += 1;
        }
        Ok(sites)
    }

    async fn site_info(&self, site_id: &str) -> Result<Site, UpstreamError> {
        self.get_json(&format!("sites/{site_id}"), &[]).await
    }

    async fn list_enabled_metrics(&self, site_id: &str) -> Result<Vec<String>, UpstreamError> {
        let value: Value = self
            .get_value(&format!("sites/{site_id}/sle/site/{site_id}/metrics"), &[])
            .await?;
        Ok(value
            .get("enabled")
            .cloned()
            .map(serde_json::from_value)
            .transpose()?
            .unwrap_or_default())
    }

    async fn sle_summary_trend(
        &self,
        site_id: &str,
        metric: &str,
        window: &TimeWindow,
    ) -> Result<SleTrend, UpstreamError> {
        self.get_json(
            &format!("sites/{site_id}/sle/site/{site_id}/metric/{metric}/summary-trend"),
            &window.query_params(),
        )
        .await
    }

    async fn sle_summary(
        &self,
        site_id: &str,
        metric: &str,
        window: &TimeWindow,
    ) -> Result<LegacySummary, UpstreamError> {
        self.get_json(
            &format!("sites/{site_id}/sle/site/{site_id}/metric/{metric}/summary"),
            &window.query_params(),
        )
        .await
    }

    async fn sle_impact_summary(
        &self,
        site_id: &str,
        metric: &str,
        classifier: &str,
        window: &TimeWindow,
    ) -> Result<Value, UpstreamError> {
        let mut query = window.query_params();
        query.push(("classifier", classifier.to_string()));
        self.get_value(
            &format!("sites/{site_id}/sle/site/{site_id}/metric/{metric}/impact-summary"),
            &query,
        )
        .await
    }

    async fn list_impacted_items(
        &self,
        site_id: &str,
        metric: &str,
        item_type: ItemType,
        classifier: Option<&str>,
        window: &TimeWindow,
    ) -> Result<Value, UpstreamError> {
        let mut query = window.query_params();
        if let Some(classifier) = classifier {
            query.push(("classifier", classifier.to_string()));
        }
        self.get_value(
            &format!(
                "sites/{site_id}/sle/site/{site_id}/metric/{metric}/{}",
                item_type.endpoint_segment()
            ),
            &query,
        )
        .await
    }

    async fn worst_sites_by_sle(
        &self,
        org_id: &str,
        metric: &str,
        start: i64,
        end: i64,
        limit: usize,
    ) -> Result<Vec<serde_json::Map<String, Value>>, UpstreamError> {
        let value = self
            .get_value(
                &format!("orgs/{org_id}/insights/worst-sites-by-sle"),
                &[
                    ("sle", metric.to_string()),
                    ("start", start.to_string()),
                    ("end", end.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(unwrap_results(value)
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect())
    }

    async fn list_device_stats(
        &self,
        site_id: &str,
        device_type: &str,
    ) -> Result<Vec<Value>, UpstreamError> {
        let value = self
            .get_value(
                &format!("sites/{site_id}/stats/devices"),
                &[
                    ("type", device_type.to_string()),
                    ("limit", PAGE_LIMIT.to_string()),
                ],
            )
            .await?;
        Ok(unwrap_results(value))
    }
}
