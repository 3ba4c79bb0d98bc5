//! End-to-end tests through the axum router, with the upstream mocked.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sle_dashboard::server::create_app;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod test_utils;
use test_utils::{mount_enabled_metrics, mount_summary, mount_trend, test_state};

async fn get(app: axum::Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, headers, body)
}

fn as_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn root_reports_service_info() {
    let server = MockServer::start().await;
    let (status, _, body) = get(create_app(test_state(&server)), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_json(&body)["service"], "sle-dashboard");
}

#[tokio::test]
async fn health_does_not_touch_upstream() {
    let server = MockServer::start().await;
    let (status, _, body) = get(create_app(test_state(&server)), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_json(&body)["status"], "healthy");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_connection_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/orgs/org-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "org-1", "name": "Acme"})),
        )
        .mount(&server)
        .await;

    let response = create_app(test_state(&server))
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/test-connection")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = as_json(&body);
    assert_eq!(json["success"], true);
    assert_eq!(json["org_name"], "Acme");
}

#[tokio::test]
async fn site_sle_clamps_duration_in_response() {
    let server = MockServer::start().await;
    mount_enabled_metrics(&server, "s-1", &["gateway-health"]).await;
    mount_trend(
        &server,
        "s-1",
        "gateway-health",
        json!({"sle": {"samples": {"total": [200.0], "degraded": [1.0]}}}),
    )
    .await;

    let (status, _, body) = get(
        create_app(test_state(&server)),
        "/api/sites/s-1/sle?duration=42h",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let json = as_json(&body);
    assert_eq!(json["duration"], "1d");
    assert_eq!(json["sle"]["wan"]["metrics"]["gateway-health"], 99.5);
    assert_eq!(json["sle"]["wired"]["available"], false);
}

#[tokio::test]
async fn invalid_category_is_problem_json_400() {
    let server = MockServer::start().await;
    let (status, headers, body) = get(
        create_app(test_state(&server)),
        "/api/sites/s-1/sle/cellular",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );
    let json = as_json(&body);
    assert_eq!(json["code"], "VALIDATION_FAILED");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_item_type_is_rejected() {
    let server = MockServer::start().await;
    let (status, _, body) = get(
        create_app(test_state(&server)),
        "/api/sites/s-1/sle/coverage/impacted/routers",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(as_json(&body)["code"], "VALIDATION_FAILED");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_sle_type_is_rejected() {
    let server = MockServer::start().await;
    let (status, _, body) = get(create_app(test_state(&server)), "/api/org/sle/lte").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(as_json(&body)["code"], "VALIDATION_FAILED");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn csv_export_sets_download_headers() {
    let server = MockServer::start().await;
    mount_enabled_metrics(&server, "s-1", &["coverage"]).await;
    mount_trend(
        &server,
        "s-1",
        "coverage",
        json!({
            "sle": {"samples": {"total": [100.0], "degraded": [25.0]}},
            "classifiers": [{"name": "interference", "samples": {"degraded": [25.0]}}]
        }),
    )
    .await;
    mount_summary(&server, "s-1", "coverage", json!({})).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sites/s-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "s-1", "name": "HQ"})),
        )
        .mount(&server)
        .await;

    let (status, headers, body) = get(
        create_app(test_state(&server)),
        "/api/sites/s-1/sle/wifi/csv?duration=1d",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "text/csv");
    assert_eq!(
        headers.get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=sle_wifi_HQ_1d.csv"
    );
    let text = String::from_utf8(body).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "Metric,SLE Value (%),Classifier,Contribution (%),Impact Count"
    );
    assert_eq!(lines[1], "coverage,75.0,interference,100.0,25");
}

#[tokio::test]
async fn responses_carry_a_trace_id_header() {
    let server = MockServer::start().await;
    let (status, headers, _) = get(create_app(test_state(&server)), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers.contains_key("x-trace-id"));
}

#[tokio::test]
async fn error_body_trace_id_matches_response_header() {
    let server = MockServer::start().await;
    let (status, headers, body) = get(
        create_app(test_state(&server)),
        "/api/sites/s-1/sle/cellular",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let header_id = headers.get("x-trace-id").unwrap().to_str().unwrap();
    assert_eq!(as_json(&body)["trace_id"], header_id);
}

#[tokio::test]
async fn classifier_impact_route_returns_breakdown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(
            "/api/v1/sites/s-1/sle/site/s-1/metric/coverage/impact-summary",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ap": [{"ap_mac": "aa:bb", "name": "ap-lobby", "degraded": 9, "total": 90}]
        })))
        .mount(&server)
        .await;

    let (status, _, body) = get(
        create_app(test_state(&server)),
        "/api/sites/s-1/sle/impact/coverage/weak-signal?duration=1d",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let json = as_json(&body);
    assert_eq!(json["metric"], "coverage");
    assert_eq!(json["classifier"], "weak-signal");
    assert_eq!(json["aps"][0]["name"], "ap-lobby");
}

#[tokio::test]
async fn devices_route_lists_normalized_devices() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/sites/s-1/stats/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "d-1", "name": "sw-core", "type": "switch", "status": "connected"}
        ])))
        .mount(&server)
        .await;

    let (status, _, body) = get(
        create_app(test_state(&server)),
        "/api/sites/s-1/devices?type=switch",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let json = as_json(&body);
    assert_eq!(json["success"], true);
    assert_eq!(json["devices"][0]["type"], "switch");
    assert_eq!(json["devices"][0]["mac"], "");
}

#[tokio::test]
async fn upstream_failure_maps_to_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/orgs/org-1/sites"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let (status, _, body) = get(create_app(test_state(&server)), "/api/sites").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let json = as_json(&body);
    assert_eq!(json["code"], "UPSTREAM_ERROR");
    assert_eq!(json["details"]["status"], 500);
}

#[tokio::test]
async fn worst_sites_envelope_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/orgs/org-1/insights/worst-sites-by-sle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"site_id": "s-1", "switch-stc": 61.0}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/orgs/org-1/sites"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": "s-1", "name": "HQ"}])),
        )
        .mount(&server)
        .await;

    let (status, _, body) = get(
        create_app(test_state(&server)),
        "/api/org/sle/wired?duration=2w&limit=5",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let json = as_json(&body);
    assert_eq!(json["success"], true);
    assert_eq!(json["sle_type"], "wired");
    assert_eq!(json["duration"], "2w");
    assert_eq!(json["sites"][0]["site_name"], "HQ");
    assert_eq!(json["sites"][0]["switch-stc"], 61.0);
}
