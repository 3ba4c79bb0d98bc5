//! Test utilities for wiremock-backed upstream testing.

use std::sync::Arc;

use serde_json::json;
use sle_dashboard::config::AppConfig;
use sle_dashboard::server::AppState;
use sle_dashboard::sle::SleService;
use sle_dashboard::upstream::HttpUpstreamClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config pointing the upstream client at a mock server, org preconfigured.
#[allow(dead_code)]
pub fn test_config(server: &MockServer) -> AppConfig {
    AppConfig {
        upstream_api_token: Some("test-token".to_string()),
        upstream_base_url: server.uri(),
        upstream_org_id: Some("org-1".to_string()),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn test_client(server: &MockServer) -> HttpUpstreamClient {
    HttpUpstreamClient::from_config(&test_config(server)).expect("client from test config")
}

#[allow(dead_code)]
pub fn test_service(server: &MockServer) -> SleService {
    SleService::new(Arc::new(test_client(server)))
}

#[allow(dead_code)]
pub fn test_state(server: &MockServer) -> AppState {
    AppState::new(test_config(server), Arc::new(test_client(server)))
}

/// Mount the enabled-metrics listing for a site.
#[allow(dead_code)]
pub async fn mount_enabled_metrics(server: &MockServer, site_id: &str, metrics: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/api/v1/sites/{site_id}/sle/site/{site_id}/metrics"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "enabled": metrics })))
        .mount(server)
        .await;
}

/// Mount a summary-trend response for one metric.
#[allow(dead_code)]
pub async fn mount_trend(
    server: &MockServer,
    site_id: &str,
    metric: &str,
    body: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/api/v1/sites/{site_id}/sle/site/{site_id}/metric/{metric}/summary-trend"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount a legacy summary response for one metric.
#[allow(dead_code)]
pub async fn mount_summary(
    server: &MockServer,
    site_id: &str,
    metric: &str,
    body: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/api/v1/sites/{site_id}/sle/site/{site_id}/metric/{metric}/summary"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount a single-page site listing for the test org.
#[allow(dead_code)]
pub async fn mount_sites(server: &MockServer, sites: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/v1/orgs/org-1/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sites))
        .mount(server)
        .await;
}
