//! Shared helpers for integration tests

use axum::{body::Body, http::Request, Router};
use pr_labeler::middleware::{sign, SIGNATURE_HEADER};
use pr_labeler::{build_app, AppConfig, GithubConfig, LabelerConfig, SecurityConfig, ServerConfig};
use serde_json::Value;
use std::path::PathBuf;

pub const SECRET: &str = "test-webhook-secret";
pub const PREVIOUS_SECRET: &str = "previous-webhook-secret";

/// Read a file from `tests/fixtures`
pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// Configuration pointing the GitHub client at `api_url`
pub fn test_config(api_url: &str) -> AppConfig {
    AppConfig {
        server: ServerConfig::default(),
        github: GithubConfig {
            api_url: api_url.to_string(),
            token: Some("ghp_test_token".to_string()),
            ..GithubConfig::default()
        },
        security: SecurityConfig {
            webhook_secret: SECRET.to_string(),
            webhook_secret_previous: Some(PREVIOUS_SECRET.to_string()),
        },
        labeler: LabelerConfig::default(),
    }
}

pub fn app(config: &AppConfig) -> Router {
    build_app(config).expect("Failed to build app")
}

/// A webhook request signed with `secret`
pub fn signed_request_with(
    secret: &str,
    event: &str,
    delivery: Option<&str>,
    body: &str,
) -> Request<Body> {
    let signature = sign(secret.as_bytes(), body.as_bytes()).expect("Failed to sign body");

    let mut builder = Request::builder()
        .method("POST")
        .uri("/hooks/github")
        .header("content-type", "application/json")
        .header("x-github-event", event)
        .header(SIGNATURE_HEADER, format!("sha256={}", signature));
    if let Some(delivery) = delivery {
        builder = builder.header("x-github-delivery", delivery);
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

/// A webhook request signed with the current secret
pub fn signed_request(event: &str, delivery: Option<&str>, body: &str) -> Request<Body> {
    signed_request_with(SECRET, event, delivery, body)
}

pub async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
