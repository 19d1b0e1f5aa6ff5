//! Router assembly

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::delivery::DeliveryCache;
use crate::error::AppResult;
use crate::github::{GithubClient, PullRequestApi};
use crate::handlers::{health_check, health_simple, webhook_handler, AppState, WebhookState};
use crate::labeler::Labeler;
use crate::labels::LabelResolver;
use crate::metrics::{metrics_router, MetricsState};
use crate::middleware::{verify_signature, SignatureState};

/// Path GitHub delivers webhooks to
pub const WEBHOOK_PATH: &str = "/hooks/github";

/// Build the application with a real GitHub client
pub fn build_app(config: &AppConfig) -> AppResult<Router> {
    let metrics = Arc::new(MetricsState::new());
    let client = GithubClient::new(&config.github)?.with_metrics(metrics.clone());
    Ok(router(config, Arc::new(client), metrics))
}

/// Assemble every route around the given GitHub API
pub fn router(
    config: &AppConfig,
    api: Arc<dyn PullRequestApi>,
    metrics: Arc<MetricsState>,
) -> Router {
    let deliveries = Arc::new(DeliveryCache::new(
        config.labeler.delivery_cache_capacity,
        config.labeler.delivery_cache_ttl_seconds,
    ));

    let signature_state =
        SignatureState::with_rotation(config.security.get_all_secrets(), config.server.max_body_bytes)
            .with_metrics(metrics.clone());
    if signature_state.is_rotation_active() {
        tracing::info!("Secret rotation grace period active - accepting both current and previous secrets");
    }

    let app_state = Arc::new(AppState {
        started_at: Utc::now(),
        secrets_configured: !config.security.webhook_secret.is_empty(),
        github_token_configured: api.is_authenticated(),
        signature_rotation_active: signature_state.is_rotation_active(),
        deliveries: deliveries.clone(),
    });

    let webhook_state = Arc::new(WebhookState {
        labeler: Labeler::new(api, LabelResolver::from_config(&config.labeler)),
        config: config.labeler.clone(),
        deliveries,
        metrics: metrics.clone(),
    });

    // Webhook routes (require signature verification)
    let webhook_routes = Router::new()
        .route(WEBHOOK_PATH, post(webhook_handler))
        .layer(axum_middleware::from_fn_with_state(
            signature_state,
            verify_signature,
        ))
        .layer(DefaultBodyLimit::max(config.server.max_body_bytes))
        .with_state(webhook_state);

    // Health routes (no authentication)
    let health_routes = Router::new()
        .route("/health", get(health_simple))
        .route("/api/v1/health", get(health_check))
        .with_state(app_state);

    Router::new()
        .merge(webhook_routes)
        .merge(health_routes)
        .merge(metrics_router().with_state(metrics))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(Duration::from_millis(
                    config.server.request_timeout_ms,
                ))),
        )
}
