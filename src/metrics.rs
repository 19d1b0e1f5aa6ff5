//! Prometheus metrics for the PR labeler
//!
//! Exposes metrics endpoint for monitoring:
//! - Webhook deliveries by event and outcome
//! - Labels applied
//! - Signature verification failures
//! - GitHub API latency histogram

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Metrics state
pub struct MetricsState {
    /// Prometheus registry
    registry: Registry,
    /// Webhook deliveries (labels: event, outcome)
    pub webhooks_received: IntCounterVec,
    /// Total labels added to pull requests
    pub labels_applied: IntCounter,
    /// Requests rejected by signature verification
    pub signature_failures: IntCounter,
    /// GitHub API latency histogram by endpoint (in milliseconds)
    pub github_latency: HistogramVec,
}

impl MetricsState {
    /// Create a new metrics state with all metrics registered
    pub fn new() -> Self {
        let registry = Registry::new();

        let webhooks_received = IntCounterVec::new(
            Opts::new(
                "labeler_webhooks_received_total",
                "Webhook deliveries by event and outcome",
            ),
            &["event", "outcome"],
        )
        .expect("Failed to create webhooks_received counter");
        registry
            .register(Box::new(webhooks_received.clone()))
            .expect("Failed to register webhooks_received");

        let labels_applied = IntCounter::with_opts(Opts::new(
            "labeler_labels_applied_total",
            "Total number of labels added to pull requests",
        ))
        .expect("Failed to create labels_applied counter");
        registry
            .register(Box::new(labels_applied.clone()))
            .expect("Failed to register labels_applied");

        let signature_failures = IntCounter::with_opts(Opts::new(
            "labeler_signature_failures_total",
            "Webhook requests rejected by signature verification",
        ))
        .expect("Failed to create signature_failures counter");
        registry
            .register(Box::new(signature_failures.clone()))
            .expect("Failed to register signature_failures");

        let github_latency = HistogramVec::new(
            HistogramOpts::new(
                "labeler_github_latency_ms",
                "GitHub API call latency in milliseconds",
            ),
            &["endpoint"],
        )
        .expect("Failed to create github_latency histogram");
        registry
            .register(Box::new(github_latency.clone()))
            .expect("Failed to register github_latency");

        Self {
            registry,
            webhooks_received,
            labels_applied,
            signature_failures,
            github_latency,
        }
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Count one webhook delivery
    pub fn record_webhook(&self, event: &str, outcome: &str) {
        self.webhooks_received
            .with_label_values(&[event, outcome])
            .inc();
    }
}

impl Default for MetricsState {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics handler - returns Prometheus metrics in text format
///
/// GET /metrics
pub async fn metrics_handler(State(state): State<Arc<MetricsState>>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = state.registry().gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("Content-Type", "text/plain; version=0.0.4")],
            Vec::new(),
        );
    }

    (
        StatusCode::OK,
        [("Content-Type", "text/plain; version=0.0.4")],
        buffer,
    )
}

/// Create metrics router
pub fn metrics_router() -> Router<Arc<MetricsState>> {
    Router::new().route("/metrics", get(metrics_handler))
}
