//! Integration tests for `DataClient` and bundle resolution.
//!
//! Uses `wiremock` so no real network traffic is made.

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storeloc_core::{PlanTier, ViewMode};
use storeloc_widget::{resolve_bundle, DataClient, HostPlatform, WidgetError, FALLBACK_VERSION};

fn test_client(server: &MockServer) -> DataClient {
    DataClient::new(&format!("{}/api/widget", server.uri()), 5, "storeloc-test/0.1")
        .expect("failed to build test DataClient")
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("failed to build reqwest client")
}

// ---------------------------------------------------------------------------
// Combined data endpoint
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_forwards_identity_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/widget"))
        .and(header("authorization", "inst-token"))
        .and(header("x-wix-comp-id", "comp-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "config": {"defaultView": "list", "premiumPlanName": "business"},
            "locations": [
                {"id": 1, "name": "First", "latitude": "40.1", "longitude": -73.9},
                {"_id": "abc", "name": "Second", "category": "store"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let platform = HostPlatform::new(Some("inst-token".to_string()), Some("comp-42".to_string()));
    let result = test_client(&server).fetch(&platform).await;

    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let payload = result.unwrap();
    assert_eq!(payload.config.default_view, ViewMode::List);
    assert_eq!(payload.config.premium_plan_name, PlanTier::Business);
    assert_eq!(payload.locations.len(), 2);
    assert!(payload.locations[0].is_plottable());
    assert!(!payload.locations[1].is_plottable());
}

#[tokio::test]
async fn fetch_without_identity_sends_no_auth_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/widget"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"config": {}})))
        .mount(&server)
        .await;

    let result = test_client(&server)
        .fetch(&HostPlatform::unauthenticated())
        .await;
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    assert!(result.unwrap().locations.is_empty());

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
    assert!(requests[0].headers.get("x-wix-comp-id").is_none());
}

#[tokio::test]
async fn fetch_returns_unexpected_status_on_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/widget"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = test_client(&server)
        .fetch(&HostPlatform::unauthenticated())
        .await;
    assert!(
        matches!(result, Err(WidgetError::UnexpectedStatus { status: 503, .. })),
        "expected UnexpectedStatus(503), got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_returns_deserialize_error_on_invalid_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/widget"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = test_client(&server)
        .fetch(&HostPlatform::unauthenticated())
        .await;
    assert!(
        matches!(result, Err(WidgetError::Deserialize { .. })),
        "expected Deserialize, got: {result:?}"
    );
}

// ---------------------------------------------------------------------------
// Loader manifest
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resolve_bundle_uses_manifest_version() {
    let server = MockServer::start().await;
    let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

    Mock::given(method("GET"))
        .and(path("/widget/manifest.json"))
        .and(query_param("v", "1700000000000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": "2.3.1",
            "buildTime": "2024-05-01T12:00:00Z"
        })))
        .mount(&server)
        .await;

    let base = format!("{}/widget", server.uri());
    let bundle = resolve_bundle(&http_client(), &base, now).await.unwrap();

    assert_eq!(bundle.version, "2.3.1");
    assert_eq!(bundle.script_url, format!("{base}/widget.2.3.1.min.js"));
    assert_eq!(bundle.stylesheet_url, format!("{base}/widget.2.3.1.min.css"));
    assert_eq!(bundle.build_time.as_deref(), Some("2024-05-01T12:00:00Z"));
}

#[tokio::test]
async fn resolve_bundle_falls_back_to_latest_when_manifest_missing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let bundle = resolve_bundle(&http_client(), &server.uri(), Utc::now())
        .await
        .unwrap();

    assert_eq!(bundle.version, FALLBACK_VERSION);
    assert_eq!(
        bundle.script_url,
        format!("{}/widget.latest.min.js", server.uri())
    );
    assert!(bundle.build_time.is_none());
}

#[tokio::test]
async fn resolve_bundle_falls_back_on_malformed_manifest() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "../../etc"})))
        .mount(&server)
        .await;

    let bundle = resolve_bundle(&http_client(), &server.uri(), Utc::now())
        .await
        .unwrap();
    assert_eq!(bundle.version, FALLBACK_VERSION);
}
