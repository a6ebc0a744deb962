//! Privileged container validation policy.
//!
//! Denies pods where any container asks for `securityContext.privileged`.
//! The message does not identify the offending container; callers get the
//! same fixed text regardless of position or count.

use super::{ValidationContext, ValidationResult};

/// Policy name used in logs and metrics
pub const REASON: &str = "PrivilegedContainer";

const MESSAGE: &str = "Privileged containers are not allowed";

/// Validate that no container runs privileged.
///
/// A pod with no containers passes.
pub fn validate(ctx: &ValidationContext<'_>) -> ValidationResult {
    if ctx.pod.containers.iter().any(|c| c.privileged) {
        return ValidationResult::denied(REASON, MESSAGE);
    }

    ValidationResult::allowed()
}
