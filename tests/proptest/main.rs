// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Property-based tests for the admission policy engine.
//!
//! Uses proptest to generate random pods and verify engine invariants.
//!
//! ```bash
//! cargo test --test proptest
//! ```

use std::collections::BTreeMap;

use proptest::prelude::*;

use pod_policy_webhook::webhooks::pod::{ContainerView, PodView};
use pod_policy_webhook::webhooks::policies::{
    ValidationContext, privileged, required_labels, validate_all,
};

/// Strategy for label keys.
fn label_key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,14}"
}

/// Strategy for a labels mapping.
fn labels_map() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(label_key(), "[a-z0-9]{0,8}", 0..6)
}

/// Strategy for container privileged flags.
fn container_list() -> impl Strategy<Value = Vec<ContainerView>> {
    prop::collection::vec(any::<bool>(), 0..6).prop_map(|flags| {
        flags
            .into_iter()
            .map(|privileged| ContainerView { privileged })
            .collect()
    })
}

/// Strategy for an ordered required-label configuration with unique keys.
fn required_config() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set(label_key(), 0..5).prop_map(|keys| keys.into_iter().collect())
}

proptest! {
    /// Property: pods carrying every required key pass the label policy,
    /// whatever extra labels they carry.
    #[test]
    fn test_superset_of_required_labels_passes(
        required in required_config(),
        extra in labels_map(),
    ) {
        let mut labels = extra;
        for key in &required {
            labels.insert(key.clone(), "v".to_string());
        }
        let pod = PodView { labels, containers: Vec::new() };
        let ctx = ValidationContext { pod: &pod, required_labels: &required };

        prop_assert!(required_labels::validate(&ctx).allowed);
    }

    /// Property: the denial message lists exactly the missing keys, in
    /// configured order.
    #[test]
    fn test_missing_labels_reported_in_configured_order(
        required in required_config(),
        labels in labels_map(),
    ) {
        let missing: Vec<String> = required
            .iter()
            .filter(|key| !labels.contains_key(key.as_str()))
            .cloned()
            .collect();

        let pod = PodView { labels, containers: Vec::new() };
        let ctx = ValidationContext { pod: &pod, required_labels: &required };
        let result = required_labels::validate(&ctx);

        if missing.is_empty() {
            prop_assert!(result.allowed);
        } else {
            let listed = missing
                .iter()
                .map(|key| format!("'{}'", key))
                .collect::<Vec<_>>()
                .join(", ");
            prop_assert_eq!(
                result.message.unwrap(),
                format!("Missing required labels: [{}]", listed)
            );
        }
    }

    /// Property: the privileged policy denies exactly when some container is
    /// privileged; the empty pod passes.
    #[test]
    fn test_privileged_detection(containers in container_list()) {
        let any_privileged = containers.iter().any(|c| c.privileged);
        let pod = PodView { labels: BTreeMap::new(), containers };
        let ctx = ValidationContext { pod: &pod, required_labels: &[] };

        let result = privileged::validate(&ctx);
        prop_assert_eq!(result.allowed, !any_privileged);
    }

    /// Property: the engine is deterministic. The same input always yields
    /// the same verdict and message.
    #[test]
    fn test_engine_is_deterministic(
        required in required_config(),
        labels in labels_map(),
        containers in container_list(),
    ) {
        let pod = PodView { labels, containers };
        let ctx = ValidationContext { pod: &pod, required_labels: &required };

        let first = validate_all(&ctx);
        let second = validate_all(&ctx);
        prop_assert_eq!(first.allowed, second.allowed);
        prop_assert_eq!(first.reason, second.reason);
        prop_assert_eq!(first.message, second.message);
    }

    /// Property: when required labels are missing, the label message wins
    /// even if a privileged container is also present.
    #[test]
    fn test_label_policy_short_circuits(
        required in prop::collection::btree_set(label_key(), 1..5),
    ) {
        let required: Vec<String> = required.into_iter().collect();
        let pod = PodView {
            labels: BTreeMap::new(),
            containers: vec![ContainerView { privileged: true }],
        };
        let ctx = ValidationContext { pod: &pod, required_labels: &required };

        let result = validate_all(&ctx);
        prop_assert!(!result.allowed);
        prop_assert!(result.message.unwrap().starts_with("Missing required labels:"));
    }
}
