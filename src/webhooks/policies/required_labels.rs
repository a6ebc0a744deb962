//! Required label validation policy.
//!
//! Denies pods that do not carry every configured label key. The denial
//! message lists the missing keys in configured order; downstream tooling
//! parses that text, so the format is part of the contract.

use super::{ValidationContext, ValidationResult};

/// Policy name used in logs and metrics
pub const REASON: &str = "MissingRequiredLabels";

/// Validate that every required label key is present.
///
/// A label present with an empty-string value counts as present; only the key
/// matters.
pub fn validate(ctx: &ValidationContext<'_>) -> ValidationResult {
    let missing: Vec<&str> = ctx
        .required_labels
        .iter()
        .filter(|key| !ctx.pod.labels.contains_key(key.as_str()))
        .map(|key| key.as_str())
        .collect();

    if missing.is_empty() {
        return ValidationResult::allowed();
    }

    let listed = missing
        .iter()
        .map(|key| format!("'{}'", key))
        .collect::<Vec<_>>()
        .join(", ");
    ValidationResult::denied(REASON, format!("Missing required labels: [{}]", listed))
}
