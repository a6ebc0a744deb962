//! Webhook module for validating Pod admission requests.
//!
//! The policy engine lives in [`policies`]; [`pod`] resolves the dynamic
//! admission object into the view the policies consume; [`server`] is the
//! HTTPS transport around both.

pub mod pod;
pub mod policies;
mod server;

pub use pod::{ContainerView, PodView};
pub use policies::{PolicyConfig, ValidationContext, ValidationResult, validate_all};
pub use server::{
    WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, WEBHOOK_PORT, WebhookError, WebhookState,
    create_webhook_router, run_webhook_server,
};

// Re-export kube-rs admission types for contract testing
pub use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
