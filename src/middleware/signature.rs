//! Webhook signature verification middleware
//!
//! Verifies GitHub's `X-Hub-Signature-256` header, an HMAC-SHA256 of the raw
//! request body keyed with the webhook secret, rendered as `sha256=<hex>`.
//!
//! Secret Rotation:
//! - Supports both current and previous secret during grace period
//! - Logs which secret was used for audit purposes

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use crate::error::AppError;
use crate::metrics::MetricsState;

/// Header carrying the body signature
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";
/// Prefix GitHub puts before the hex digest
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Signature verification state with support for secret rotation
#[derive(Clone)]
pub struct SignatureState {
    /// List of valid webhook secrets (current + previous during rotation)
    secrets: Arc<Vec<Vec<u8>>>,
    /// Largest body read for verification
    max_body_bytes: usize,
    /// Failure counter
    metrics: Option<Arc<MetricsState>>,
}

impl SignatureState {
    /// Create a new state with a single secret
    pub fn new(secret: String, max_body_bytes: usize) -> Self {
        Self::with_rotation(vec![secret], max_body_bytes)
    }

    /// Create a new state with multiple secrets (for rotation grace period)
    ///
    /// The first secret is the current/primary secret.
    /// Additional secrets are previous secrets that are still valid during rotation.
    pub fn with_rotation(secrets: Vec<String>, max_body_bytes: usize) -> Self {
        let secret_bytes: Vec<Vec<u8>> = secrets
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.into_bytes())
            .collect();

        if secret_bytes.is_empty() {
            tracing::warn!("SignatureState created with no valid secrets, all webhooks will be rejected");
        }

        Self {
            secrets: Arc::new(secret_bytes),
            max_body_bytes,
            metrics: None,
        }
    }

    /// Count verification failures in `metrics`
    pub fn with_metrics(mut self, metrics: Arc<MetricsState>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Check if rotation is active (multiple secrets configured)
    pub fn is_rotation_active(&self) -> bool {
        self.secrets.len() > 1
    }

    fn reject(&self, error: AppError) -> Response {
        if let Some(metrics) = &self.metrics {
            metrics.signature_failures.inc();
        }
        error.into_response()
    }
}

/// Result of signature verification
#[derive(Debug)]
enum VerificationResult {
    /// Signature matched using secret at given index
    Valid { secret_index: usize },
    /// No secrets matched
    Invalid,
}

/// Signature verification middleware
///
/// Reads the body, verifies HMAC-SHA256 against every configured secret and
/// hands the untouched body on to the handler.
pub async fn verify_signature(
    State(state): State<SignatureState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    // Extract signature header
    let header = match headers.get(SIGNATURE_HEADER) {
        Some(sig) => match sig.to_str() {
            Ok(s) => s.to_string(),
            Err(_) => {
                return state.reject(AppError::Validation("Invalid signature header encoding".to_string()));
            }
        },
        None => {
            return state.reject(AppError::Auth("Missing X-Hub-Signature-256 header".to_string()));
        }
    };

    let signature = match header.strip_prefix(SIGNATURE_PREFIX) {
        Some(hex_digest) => hex_digest.to_ascii_lowercase(),
        None => {
            return state.reject(AppError::Validation("Signature must start with sha256=".to_string()));
        }
    };

    // Read body for signature verification
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return state.reject(AppError::Validation("Failed to read request body".to_string()));
        }
    };

    // Try verification with each secret
    match verify_with_secrets(&state.secrets, &signature, &body_bytes) {
        VerificationResult::Valid { secret_index } => {
            if secret_index > 0 {
                // Using a previous/rotated secret
                tracing::info!(
                    secret_index = secret_index,
                    "Signature verified with rotated secret (grace period active)"
                );
            } else {
                tracing::debug!(body_size = body_bytes.len(), "Signature verification successful");
            }

            // Reconstruct request with body and continue
            let request = Request::from_parts(parts, Body::from(body_bytes));
            next.run(request).await
        }
        VerificationResult::Invalid => {
            tracing::warn!(
                secrets_tried = state.secrets.len(),
                "Webhook signature verification failed"
            );
            state.reject(AppError::Auth("Invalid signature".to_string()))
        }
    }
}

/// Hex-encoded HMAC-SHA256 of `body`
pub fn sign(secret: &[u8], body: &[u8]) -> Option<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret).ok()?;
    mac.update(body);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Verify signature against multiple secrets
fn verify_with_secrets(secrets: &[Vec<u8>], signature: &str, body_bytes: &[u8]) -> VerificationResult {
    for (index, secret) in secrets.iter().enumerate() {
        let Some(expected_signature) = sign(secret, body_bytes) else {
            tracing::error!(secret_index = index, "Failed to create HMAC instance");
            continue;
        };

        // Constant-time comparison to prevent timing attacks
        if constant_time_compare(signature, &expected_signature) {
            return VerificationResult::Valid {
                secret_index: index,
            };
        }
    }

    VerificationResult::Invalid
}

/// Constant-time string comparison to prevent timing attacks
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
