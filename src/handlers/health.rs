//! Health check endpoint

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::delivery::DeliveryCache;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service status
    pub status: HealthStatus,
    /// Crate version
    pub version: &'static str,
    /// Uptime in seconds
    pub uptime_seconds: i64,
    /// Whether GitHub requests are authenticated
    pub github_token_configured: bool,
    /// Whether a previous webhook secret is still accepted
    pub signature_rotation_active: bool,
    /// Delivery ids currently remembered
    pub cached_deliveries: usize,
}

/// Health status enum
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational
    Healthy,
    /// Running, but GitHub calls are unauthenticated and heavily rate limited
    Degraded,
    /// No webhook secret, every delivery will be rejected
    Unhealthy,
}

/// Shared application state for health checks
pub struct AppState {
    /// Application start time
    pub started_at: chrono::DateTime<Utc>,
    /// Whether at least one webhook secret is configured
    pub secrets_configured: bool,
    /// Whether a GitHub token is configured
    pub github_token_configured: bool,
    /// Whether secret rotation is in progress
    pub signature_rotation_active: bool,
    /// Delivery cache shared with the webhook handler
    pub deliveries: Arc<DeliveryCache>,
}

/// Health check handler
///
/// GET /api/v1/health
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let uptime = (Utc::now() - state.started_at).num_seconds();

    let status = if !state.secrets_configured {
        HealthStatus::Unhealthy
    } else if !state.github_token_configured {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    };

    let status_code = match status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: uptime,
        github_token_configured: state.github_token_configured,
        signature_rotation_active: state.signature_rotation_active,
        cached_deliveries: state.deliveries.len(),
    };

    (status_code, Json(response))
}

/// Simple health check (for load balancers)
///
/// GET /health
pub async fn health_simple() -> StatusCode {
    StatusCode::OK
}
