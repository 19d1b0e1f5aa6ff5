//! Webhook handler for incoming GitHub events

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::config::LabelerConfig;
use crate::delivery::DeliveryCache;
use crate::error::AppError;
use crate::labeler::{LabelOutcome, Labeler};
use crate::metrics::MetricsState;
use crate::models::{
    GithubEvent, PullRequestAction, PullRequestEvent, DELIVERY_HEADER, EVENT_HEADER,
};

/// Webhook response
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// What the service did with the delivery
    pub status: WebhookStatus,
    /// Labels added to the pull request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    /// Why the delivery was ignored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl WebhookResponse {
    fn pong() -> Self {
        Self {
            status: WebhookStatus::Pong,
            labels: None,
            reason: None,
        }
    }

    fn labeled(labels: Vec<String>) -> Self {
        Self {
            status: WebhookStatus::Labeled,
            labels: Some(labels),
            reason: None,
        }
    }

    fn ignored(reason: &str) -> Self {
        Self {
            status: WebhookStatus::Ignored,
            labels: None,
            reason: Some(reason.to_string()),
        }
    }
}

/// Webhook status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookStatus {
    /// Answer to GitHub's ping event
    Pong,
    /// Labels were added to a pull request
    Labeled,
    /// Delivery accepted, nothing to do
    Ignored,
}

/// State needed by the webhook handler
pub struct WebhookState {
    /// Labeling pipeline
    pub labeler: Labeler,
    /// Repository allow-list and label options
    pub config: LabelerConfig,
    /// Recently handled deliveries
    pub deliveries: Arc<DeliveryCache>,
    /// Metrics
    pub metrics: Arc<MetricsState>,
}

/// Webhook handler
///
/// POST /hooks/github
///
/// Signature verification is handled by middleware. Only `pull_request`
/// events with the `opened` action trigger labeling; everything else is
/// acknowledged with 200 so GitHub does not retry it.
pub async fn webhook_handler(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<WebhookResponse>), AppError> {
    let event: GithubEvent = match headers.get(EVENT_HEADER).and_then(|h| h.to_str().ok()) {
        Some(name) if !name.trim().is_empty() => GithubEvent::from(name),
        _ => {
            state.metrics.record_webhook("unknown", "rejected");
            return Err(AppError::Validation(format!("Missing {} header", EVENT_HEADER)));
        }
    };

    let delivery = headers
        .get(DELIVERY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);
    let delivery_label = delivery
        .clone()
        .unwrap_or_else(|| format!("local-{}", uuid::Uuid::new_v4()));

    if let Some(ref id) = delivery {
        if !state.deliveries.reserve(id) {
            tracing::info!(delivery = %id, event = %event, "Duplicate delivery ignored");
            state.metrics.record_webhook(event.as_str(), "duplicate");
            return Ok(ignored("duplicate_delivery"));
        }
    }

    let response = match event {
        GithubEvent::Ping => {
            tracing::info!(delivery = %delivery_label, "Received ping");
            state.metrics.record_webhook("ping", "pong");
            WebhookResponse::pong()
        }
        GithubEvent::PullRequest => {
            match handle_pull_request(&state, &delivery_label, &body).await {
                Ok(response) => response,
                Err(e) => {
                    state.metrics.record_webhook("pull_request", "error");
                    if let Some(ref id) = delivery {
                        state.deliveries.release(id);
                    }
                    return Err(e);
                }
            }
        }
        GithubEvent::Other(ref name) => {
            tracing::debug!(delivery = %delivery_label, event = %name, "Event not handled");
            state.metrics.record_webhook(name, "ignored");
            WebhookResponse::ignored("event_not_handled")
        }
    };

    Ok((StatusCode::OK, Json(response)))
}

async fn handle_pull_request(
    state: &WebhookState,
    delivery: &str,
    body: &[u8],
) -> Result<WebhookResponse, AppError> {
    let payload: PullRequestEvent = serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid pull_request payload: {}", e)))?;

    let pr = payload.pull_request_ref();

    if payload.action != PullRequestAction::Opened {
        tracing::debug!(
            delivery = %delivery,
            pull_request = %pr,
            action = ?payload.action,
            "Pull request action not handled"
        );
        state.metrics.record_webhook("pull_request", "ignored");
        return Ok(WebhookResponse::ignored("action_not_handled"));
    }

    if !state.config.is_repository_enabled(&pr.owner, &pr.repo) {
        tracing::info!(delivery = %delivery, pull_request = %pr, "Repository not enabled for labeling");
        state.metrics.record_webhook("pull_request", "ignored");
        return Ok(WebhookResponse::ignored("repository_not_enabled"));
    }

    tracing::info!(delivery = %delivery, pull_request = %pr, "Labeling opened pull request");

    match state
        .labeler
        .label_pull_request(&pr, Some(payload.base_branch()))
        .await?
    {
        LabelOutcome::Labeled(labels) => {
            state.metrics.record_webhook("pull_request", "labeled");
            state.metrics.labels_applied.inc_by(labels.len() as u64);
            tracing::info!(delivery = %delivery, pull_request = %pr, labels = %labels, "Pull request labeled");
            Ok(WebhookResponse::labeled(labels.into_vec()))
        }
        LabelOutcome::NoLabels => {
            state.metrics.record_webhook("pull_request", "no_labels");
            Ok(WebhookResponse::ignored("no_matching_labels"))
        }
    }
}

fn ignored(reason: &str) -> (StatusCode, Json<WebhookResponse>) {
    (StatusCode::OK, Json(WebhookResponse::ignored(reason)))
}
