//! Admission webhook server.
//!
//! Serves `POST /validate` over TLS. The handler extracts the admission
//! request, resolves the pod payload once, runs the policy engine, and wraps
//! the verdict back into an `AdmissionReview` response that echoes the
//! request uid. Completed evaluations always return HTTP 200; only the
//! verdict payload signals accept/reject.

use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::health::HealthState;
use crate::webhooks::pod::PodView;
use crate::webhooks::policies::{PolicyConfig, ValidationContext, validate_all};

/// Default path to webhook TLS certificate
pub const WEBHOOK_CERT_PATH: &str = "/certs/tls.crt";
/// Default path to webhook TLS private key
pub const WEBHOOK_KEY_PATH: &str = "/certs/tls.key";
/// Default webhook server port
pub const WEBHOOK_PORT: u16 = 8443;

/// Shared state for webhook handlers
pub struct WebhookState {
    /// Read-only policy configuration, fixed at startup
    pub policy: PolicyConfig,
    /// Shared readiness and metrics
    pub health: Arc<HealthState>,
}

impl WebhookState {
    pub fn new(policy: PolicyConfig, health: Arc<HealthState>) -> Self {
        Self { policy, health }
    }
}

/// Create the webhook router
pub fn create_webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/validate", post(validate_pod))
        .with_state(state)
}

/// Validate a Pod admission webhook handler
async fn validate_pod(
    State(state): State<Arc<WebhookState>>,
    Json(review): Json<AdmissionReview<DynamicObject>>,
) -> impl IntoResponse {
    let started = Instant::now();

    let request: AdmissionRequest<DynamicObject> = match review.try_into() {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "Failed to extract admission request");
            return (
                StatusCode::BAD_REQUEST,
                Json(
                    AdmissionResponse::invalid(format!("Invalid AdmissionReview: {}", e))
                        .into_review(),
                ),
            );
        }
    };

    debug!(
        uid = %request.uid,
        operation = ?request.operation,
        namespace = ?request.namespace,
        name = ?request.name,
        "Processing admission request"
    );

    // DELETE operations carry no object to validate and are always allowed
    if request.operation == Operation::Delete {
        info!(uid = %request.uid, "Admission request allowed (DELETE)");
        return (
            StatusCode::OK,
            Json(AdmissionResponse::from(&request).into_review()),
        );
    }

    let object = match &request.object {
        Some(obj) => obj,
        None => {
            error!(uid = %request.uid, "Missing object in request");
            return (
                StatusCode::OK,
                Json(
                    AdmissionResponse::from(&request)
                        .deny("Missing object in request")
                        .into_review(),
                ),
            );
        }
    };

    // Resolve the pod fields once; policies never touch raw JSON
    let pod = match PodView::from_object(object) {
        Ok(pod) => pod,
        Err(e) => {
            warn!(uid = %request.uid, error = %e, "Unusable pod payload");
            return (
                StatusCode::OK,
                Json(
                    AdmissionResponse::from(&request)
                        .deny(format!("Invalid pod payload: {}", e))
                        .into_review(),
                ),
            );
        }
    };

    let ctx = ValidationContext {
        pod: &pod,
        required_labels: &state.policy.required_labels,
    };
    let result = validate_all(&ctx);
    state
        .health
        .metrics
        .record_review(result.allowed, started.elapsed().as_secs_f64());

    if !result.allowed {
        let reason = result.reason.unwrap_or("ValidationFailed");
        let message = result
            .message
            .unwrap_or_else(|| "Validation failed".to_string());
        state.health.metrics.record_denial(reason);
        warn!(uid = %request.uid, reason = %reason, message = %message, "Admission request denied");
        return (
            StatusCode::OK,
            Json(
                AdmissionResponse::from(&request)
                    .deny(message)
                    .into_review(),
            ),
        );
    }

    info!(uid = %request.uid, "Admission request allowed");
    (
        StatusCode::OK,
        Json(AdmissionResponse::from(&request).into_review()),
    )
}

/// Errors that can occur when running the webhook server
#[derive(Debug, Error)]
pub enum WebhookError {
    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),
    /// Server error
    #[error("Webhook server error: {0}")]
    Server(String),
}

/// Run the webhook server with TLS
///
/// Binds to 0.0.0.0 on the given port and serves the /validate endpoint.
/// TLS certificates are loaded from the paths specified.
///
/// # Arguments
/// * `policy` - Policy configuration, fixed for the process lifetime
/// * `health` - Shared readiness and metrics state
/// * `cert_path` - Path to TLS certificate file (PEM format)
/// * `key_path` - Path to TLS private key file (PEM format)
/// * `port` - HTTPS port to bind
pub async fn run_webhook_server(
    policy: PolicyConfig,
    health: Arc<HealthState>,
    cert_path: &str,
    key_path: &str,
    port: u16,
) -> Result<(), WebhookError> {
    use axum_server::tls_rustls::RustlsConfig;
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let state = Arc::new(WebhookState::new(policy, health.clone()));
    let app = create_webhook_router(state);

    let config = RustlsConfig::from_pem_file(PathBuf::from(cert_path), PathBuf::from(key_path))
        .await
        .map_err(|e| WebhookError::TlsConfig(e.to_string()))?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "Webhook server listening with TLS");

    // Probes may flip to ready as soon as the listener is up
    health.set_ready(true).await;

    axum_server::bind_rustls(addr, config)
        .serve(app.into_make_service())
        .await
        .map_err(|e| WebhookError::Server(e.to_string()))?;

    Ok(())
}
