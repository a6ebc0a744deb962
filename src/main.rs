//! pod-policy-webhook - A Kubernetes validating admission webhook for Pods.
//!
//! This is the main entry point that:
//! - Initializes structured logging
//! - Builds the policy configuration from the environment
//! - Starts the health server and the TLS webhook server

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{error, info, warn};

use pod_policy_webhook::health::{HealthState, run_health_server};
use pod_policy_webhook::webhooks::PolicyConfig;
use pod_policy_webhook::{WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, WEBHOOK_PORT, run_webhook_server};

/// Grace period for in-flight admission reviews to complete during shutdown
const SHUTDOWN_GRACE_PERIOD_SECS: u64 = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pod_policy_webhook=info".parse()?),
        )
        .json()
        .init();

    info!("Starting pod-policy-webhook");

    let policy = policy_from_env();
    info!(required_labels = ?policy.required_labels, "Loaded policy configuration");

    let cert_path =
        std::env::var("TLS_CERT_PATH").unwrap_or_else(|_| WEBHOOK_CERT_PATH.to_string());
    let key_path = std::env::var("TLS_KEY_PATH").unwrap_or_else(|_| WEBHOOK_KEY_PATH.to_string());
    let port = webhook_port_from_env();

    // No TLS material means nothing to serve; fail fast
    if !Path::new(&cert_path).exists() || !Path::new(&key_path).exists() {
        error!(
            cert_path = %cert_path,
            key_path = %key_path,
            "TLS certificate or key not found"
        );
        return Err("webhook TLS certificate and key are required".into());
    }

    // Create shared health state
    let health_state = Arc::new(HealthState::new());

    // Start health server immediately (liveness should work before ready)
    let health_handle = {
        let health_state = health_state.clone();
        tokio::spawn(async move {
            if let Err(e) = run_health_server(health_state).await {
                error!("Health server error: {}", e);
            }
        })
    };

    // Start webhook server; it flips readiness once listening
    let webhook_handle = {
        let health_state = health_state.clone();
        tokio::spawn(async move {
            if let Err(e) =
                run_webhook_server(policy, health_state, &cert_path, &key_path, port).await
            {
                error!("Webhook server error: {}", e);
            }
        })
    };

    // Wait for any task to complete (or fail), or shutdown signal
    tokio::select! {
        result = health_handle => {
            if let Err(e) = result {
                error!("Health server task panicked: {}", e);
            }
        }
        result = webhook_handle => {
            if let Err(e) = result {
                error!("Webhook server task panicked: {}", e);
            }
        }
        // Handle graceful shutdown on SIGTERM or SIGINT
        _ = shutdown_signal() => {
            info!("Received shutdown signal, initiating graceful shutdown...");

            // Mark as not ready so the API server stops routing reviews here
            health_state.set_ready(false).await;
            info!("Marked webhook as not ready");

            // Give in-flight admission reviews time to complete
            info!(
                "Waiting {}s for in-flight reviews to complete...",
                SHUTDOWN_GRACE_PERIOD_SECS
            );
            tokio::time::sleep(Duration::from_secs(SHUTDOWN_GRACE_PERIOD_SECS)).await;

            info!("Grace period complete, shutting down");
        }
    }

    info!("Webhook stopped");
    Ok(())
}

/// Build the policy configuration from the environment.
///
/// `REQUIRED_LABELS` is a comma-separated list of label keys; order is
/// preserved and becomes the reporting order in denial messages.
fn policy_from_env() -> PolicyConfig {
    match std::env::var("REQUIRED_LABELS") {
        Ok(raw) => {
            let labels: Vec<String> = raw
                .split(',')
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty())
                .collect();
            if labels.is_empty() {
                warn!("REQUIRED_LABELS is set but empty, using defaults");
                PolicyConfig::default()
            } else {
                PolicyConfig {
                    required_labels: labels,
                }
            }
        }
        Err(_) => PolicyConfig::default(),
    }
}

/// Read the webhook port from the environment, falling back to the default.
fn webhook_port_from_env() -> u16 {
    match std::env::var("WEBHOOK_PORT") {
        Ok(raw) => match raw.parse() {
            Ok(port) => port,
            Err(_) => {
                warn!(value = %raw, "WEBHOOK_PORT is not a valid port, using default");
                WEBHOOK_PORT
            }
        },
        Err(_) => WEBHOOK_PORT,
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// Note: Signal handler setup failures are fatal - the webhook cannot shut
/// down gracefully without them. Using expect() here is intentional.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
