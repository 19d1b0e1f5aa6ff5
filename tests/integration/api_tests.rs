//! API Integration Tests
//!
//! Tests the ambient endpoints of the real router:
//! - Health checks
//! - Prometheus metrics
//! - Request id propagation

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{app, fixture, json_body, signed_request, test_config};

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// =============================================================================
// HEALTH CHECK TESTS
// =============================================================================

#[tokio::test]
async fn test_simple_health_returns_ok() {
    let response = app(&test_config("http://127.0.0.1:9"))
        .oneshot(get("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_reports_configuration() {
    let response = app(&test_config("http://127.0.0.1:9"))
        .oneshot(get("/api/v1/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["github_token_configured"], true);
    assert_eq!(body["signature_rotation_active"], true);
    assert_eq!(body["cached_deliveries"], 0);
    assert!(body["uptime_seconds"].as_i64().unwrap() >= 0);
}

#[tokio::test]
async fn test_health_degraded_without_token() {
    let mut config = test_config("http://127.0.0.1:9");
    config.github.token = None;
    config.security.webhook_secret_previous = None;

    let response = app(&config).oneshot(get("/api/v1/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["signature_rotation_active"], false);
}

#[tokio::test]
async fn test_health_counts_cached_deliveries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/nodejs/node/pulls/19/files"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(fixture("pull-request-files.json"), "application/json"),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/nodejs/node/issues/19/labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let app = app(&test_config(&server.uri()));
    let response = app
        .clone()
        .oneshot(signed_request(
            "pull_request",
            Some("delivery-health"),
            &fixture("pull-request-opened.json"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/v1/health")).await.unwrap();
    assert_eq!(json_body(response).await["cached_deliveries"], 1);
}

// =============================================================================
// METRICS TESTS
// =============================================================================

#[tokio::test]
async fn test_metrics_exposes_webhook_counters() {
    let app = app(&test_config("http://127.0.0.1:9"));

    let response = app
        .clone()
        .oneshot(signed_request("ping", None, "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("labeler_webhooks_received_total"));
    assert!(text.contains(r#"event="ping""#));
}

// =============================================================================
// REQUEST ID TESTS
// =============================================================================

#[tokio::test]
async fn test_request_id_is_generated_and_propagated() {
    let app = app(&test_config("http://127.0.0.1:9"));

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-123");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = app(&test_config("http://127.0.0.1:9"))
        .oneshot(get("/webhook"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
