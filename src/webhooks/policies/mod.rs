//! Validation policies for Pod admission requests.
//!
//! Each policy is a stateless check over a resolved [`PodView`]. Policies run
//! in declared order (required labels, then privileged containers) and the
//! first denial wins, so the reported message is deterministic even when
//! several policies would fail.

pub mod privileged;
pub mod required_labels;

use crate::webhooks::pod::PodView;

/// Label keys enforced when no configuration is supplied, in reporting order.
pub const DEFAULT_REQUIRED_LABELS: [&str; 2] = ["team", "environment"];

/// Process-wide policy configuration.
///
/// Built once at startup and passed by reference into the request path;
/// nothing mutates it afterwards.
#[derive(Clone, Debug)]
pub struct PolicyConfig {
    /// Label keys every pod must carry. Order is preserved and becomes the
    /// reporting order in denial messages.
    pub required_labels: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            required_labels: DEFAULT_REQUIRED_LABELS
                .iter()
                .map(|label| label.to_string())
                .collect(),
        }
    }
}

/// Result of a validation check
#[derive(Debug)]
pub struct ValidationResult {
    /// Whether the validation passed
    pub allowed: bool,
    /// Stable policy name for logs and metrics (never sent on the wire)
    pub reason: Option<&'static str>,
    /// Exact text returned to the API server in `status.message`
    pub message: Option<String>,
}

impl ValidationResult {
    /// Create an allowed result
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
            message: None,
        }
    }

    /// Create a denied result
    pub fn denied(reason: &'static str, message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            message: Some(message.into()),
        }
    }
}

/// Context for validation
pub struct ValidationContext<'a> {
    /// The pod view being validated
    pub pod: &'a PodView,
    /// Required label keys, in reporting order
    pub required_labels: &'a [String],
}

/// Run all validation policies in declared order, stopping at the first denial.
pub fn validate_all(ctx: &ValidationContext<'_>) -> ValidationResult {
    let result = required_labels::validate(ctx);
    if !result.allowed {
        return result;
    }

    let result = privileged::validate(ctx);
    if !result.allowed {
        return result;
    }

    ValidationResult::allowed()
}
