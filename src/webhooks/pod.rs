//! Pod payload extraction.
//!
//! Admission objects arrive as [`DynamicObject`] so that any pod-shaped JSON
//! is accepted without schema failures. [`PodView`] resolves the handful of
//! fields the policies consume exactly once, at parse time: absent nested
//! objects become empty collections and a missing or non-boolean
//! `privileged` flag becomes `false`. Policy code never re-checks presence.

use std::collections::BTreeMap;

use kube::core::DynamicObject;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The slice of a pod the policies evaluate.
#[derive(Clone, Debug, Default)]
pub struct PodView {
    /// `metadata.labels`, empty when absent
    pub labels: BTreeMap<String, String>,
    /// `spec.containers`, empty when absent
    pub containers: Vec<ContainerView>,
}

/// Per-container fields consumed by the policies.
#[derive(Clone, Debug, Default)]
pub struct ContainerView {
    /// `securityContext.privileged`; `false` unless the field is literally `true`
    pub privileged: bool,
}

/// Tolerant mirror of the `spec` subtree. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpecFields {
    #[serde(default)]
    containers: Vec<ContainerFields>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContainerFields {
    #[serde(default)]
    security_context: Option<SecurityContextFields>,
}

#[derive(Debug, Default, Deserialize)]
struct SecurityContextFields {
    #[serde(default, deserialize_with = "bool_identity")]
    privileged: bool,
}

/// Strict boolean identity: only a JSON `true` counts. Strings, numbers, and
/// null all decode to `false` rather than erroring.
fn bool_identity<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(matches!(value, Value::Bool(true)))
}

impl PodView {
    /// Resolve an admission object into the fields the policies consume.
    ///
    /// Fails only when the `spec` subtree is structurally unusable (e.g.
    /// `containers` is not an array); absence of any field is not an error.
    pub fn from_object(object: &DynamicObject) -> Result<Self, serde_json::Error> {
        let labels = object.metadata.labels.clone().unwrap_or_default();

        let spec = match object.data.get("spec") {
            Some(Value::Null) | None => SpecFields::default(),
            Some(spec) => serde_json::from_value::<SpecFields>(spec.clone())?,
        };

        let containers = spec
            .containers
            .into_iter()
            .map(|container| ContainerView {
                privileged: container.security_context.unwrap_or_default().privileged,
            })
            .collect();

        Ok(Self { labels, containers })
    }
}
