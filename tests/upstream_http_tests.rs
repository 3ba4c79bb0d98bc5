//! HTTP client tests: auth header, org resolution, pagination, window
//! encoding, and error surfacing.

use serde_json::json;
use sle_dashboard::config::AppConfig;
use sle_dashboard::sle::duration::TimeWindow;
use sle_dashboard::upstream::{HttpUpstreamClient, UpstreamClient, UpstreamError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod test_utils;
use test_utils::test_client;

#[tokio::test]
async fn requests_carry_token_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sites/s-1"))
        .and(header("authorization", "Token test-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "s-1", "name": "HQ"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let site = test_client(&server).site_info("s-1").await.unwrap();
    assert_eq!(site.name, "HQ");
}

#[tokio::test]
async fn missing_token_fails_without_network() {
    let server = MockServer::start().await;
    let config = AppConfig {
        upstream_base_url: server.uri(),
        ..Default::default()
    };
    let client = HttpUpstreamClient::from_config(&config).unwrap();

    let error = client.site_info("s-1").await.unwrap_err();
    assert!(matches!(error, UpstreamError::Config(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn configured_org_id_wins_over_detection() {
    let server = MockServer::start().await;
    // No /self mock mounted: resolution must not need it.
    let org_id = test_client(&server).resolve_org().await.unwrap();
    assert_eq!(org_id, "org-1");
}

#[tokio::test]
async fn org_auto_detected_from_privileges() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/self"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "email": "admin@example.com",
            "privileges": [
                {"scope": "org", "org_id": "org-77", "name": "Main Org"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = AppConfig {
        upstream_api_token: Some("test-token".to_string()),
        upstream_base_url: server.uri(),
        ..Default::default()
    };
    let client = HttpUpstreamClient::from_config(&config).unwrap();

    assert_eq!(client.resolve_org().await.unwrap(), "org-77");
    // Cached: the expect(1) above verifies the second call skips the wire.
    assert_eq!(client.resolve_org().await.unwrap(), "org-77");
}

#[tokio::test]
async fn org_detection_without_privileges_is_missing_org() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/self"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"email": "x@example.com"})),
        )
        .mount(&server)
        .await;

    let config = AppConfig {
        upstream_api_token: Some("test-token".to_string()),
        upstream_base_url: server.uri(),
        ..Default::default()
    };
    let client = HttpUpstreamClient::from_config(&config).unwrap();

    let error = client.resolve_org().await.unwrap_err();
    assert!(matches!(error, UpstreamError::MissingOrg(_)));
}

#[tokio::test]
async fn site_listing_follows_pagination() {
    let server = MockServer::start().await;
    let full_page: Vec<_> = (0..1000)
        .map(|i| json!({"id": format!("s-{i}"), "name": format!("Site {i}")}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/v1/orgs/org-1/sites"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(full_page)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/orgs/org-1/sites"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "s-1000", "name": "Tail Site"}
        ])))
        .mount(&server)
        .await;

    let sites = test_client(&server).list_sites("org-1").await.unwrap();
    assert_eq!(sites.len(), 1001);
    assert_eq!(sites.last().unwrap().name, "Tail Site");
}

#[tokio::test]
async fn trend_windows_encode_duration_or_range() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/api/v1/sites/s-1/sle/site/s-1/metric/coverage/summary-trend",
        ))
        .and(query_param("duration", "1w"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(
            "/api/v1/sites/s-1/sle/site/s-1/metric/capacity/summary-trend",
        ))
        .and(query_param("start", "100"))
        .and(query_param("end", "700"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    client
        .sle_summary_trend("s-1", "coverage", &TimeWindow::Duration("1w".to_string()))
        .await
        .unwrap();
    client
        .sle_summary_trend("s-1", "capacity", &TimeWindow::Range { start: 100, end: 700 })
        .await
        .unwrap();
}

#[tokio::test]
async fn non_success_status_is_surfaced_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sites/s-1"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let error = test_client(&server).site_info("s-1").await.unwrap_err();
    match error {
        UpstreamError::Status { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body.as_deref(), Some("rate limited"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn worst_sites_accepts_bare_list_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/orgs/org-1/insights/worst-sites-by-sle"))
        .and(query_param("sle", "gateway-health"))
        .and(query_param("start", "0"))
        .and(query_param("end", "86400"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"site_id": "s-1", "gateway-health": 12.0}
        ])))
        .mount(&server)
        .await;

    let rows = test_client(&server)
        .worst_sites_by_sle("org-1", "gateway-health", 0, 86400, 100)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["gateway-health"], 12.0);
}

#[tokio::test]
async fn enabled_metrics_missing_key_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sites/s-1/sle/site/s-1/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let metrics = test_client(&server).list_enabled_metrics("s-1").await.unwrap();
    assert!(metrics.is_empty());
}

#[tokio::test]
async fn impact_summary_sends_classifier_and_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/api/v1/sites/s-1/sle/site/s-1/metric/coverage/impact-summary",
        ))
        .and(query_param("duration", "1d"))
        .and(query_param("classifier", "weak-signal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ap": [{"ap_mac": "aa:bb", "degraded": 4, "total": 40}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let raw = test_client(&server)
        .sle_impact_summary(
            "s-1",
            "coverage",
            "weak-signal",
            &TimeWindow::Duration("1d".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(raw["ap"][0]["degraded"], 4);
}

#[tokio::test]
async fn device_stats_query_by_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sites/s-1/stats/devices"))
        .and(query_param("type", "switch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"mac": "aa", "status": "connected"},
            {"mac": "bb", "status": "disconnected"}
        ])))
        .mount(&server)
        .await;

    let stats = test_client(&server)
        .list_device_stats("s-1", "switch")
        .await
        .unwrap();
    assert_eq!(stats.len(), 2);
}
