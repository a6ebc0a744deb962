//! pod-policy-webhook library crate
//!
//! This module exports the policy engine, pod extraction, webhook server,
//! and health endpoints.

pub mod health;
pub mod webhooks;

pub use health::HealthState;
pub use webhooks::{
    WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, WEBHOOK_PORT, WebhookError, run_webhook_server,
};
