//! The Pod type: a unit of scheduling owning one or more containers.
//!
//! Mirrors `original_source/models/pod.go`, generalized with the status
//! fields spec.md §3 adds (`assignedPort`, `containerID`) and a uid-derived
//! default name so repeat submissions of the same template produce
//! distinct Pods (spec.md's round-trip property 6).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity fields common to every resource kind.
///
/// `labels` uses a `BTreeMap` rather than a `HashMap` so two Pods built
/// from the same data serialize identically and so tests can assert on
/// exact JSON output, matching the teacher's choice for `ObjectMeta` in
/// `crates/kubelet/src/kubelet.rs`'s test module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

fn default_namespace() -> String {
    crate::DEFAULT_NAMESPACE.to_string()
}

impl Metadata {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Metadata {
            namespace: if namespace.is_empty() {
                crate::DEFAULT_NAMESPACE.to_string()
            } else {
                namespace
            },
            name: name.into(),
            uid: String::new(),
            labels: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerResources {
    #[serde(default)]
    pub requests: BTreeMap<String, String>,
    #[serde(default)]
    pub limits: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub name: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    #[serde(default)]
    pub resources: ContainerResources,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodSpec {
    pub containers: Vec<Container>,
    /// Empty until the scheduler assigns it. Once set, it is immutable for
    /// the lifetime of the Pod (spec.md §3 invariant).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub node_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PodPhase {
    Pending,
    Running,
    Failed,
    Succeeded,
}

impl Default for PodPhase {
    fn default() -> Self {
        PodPhase::Pending
    }
}

impl std::fmt::Display for PodPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PodPhase::Pending => "Pending",
            PodPhase::Running => "Running",
            PodPhase::Failed => "Failed",
            PodPhase::Succeeded => "Succeeded",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodStatus {
    #[serde(default)]
    pub phase: PodPhase,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host_ip: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pod_ip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub container_id: String,
    /// The container-side port the proxy will target (§9: distinct from a
    /// Service's `nodePort`, never conflated with it).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pod {
    pub metadata: Metadata,
    pub spec: PodSpec,
    #[serde(default)]
    pub status: PodStatus,
}

impl Default for Metadata {
    fn default() -> Self {
        Metadata::new(crate::DEFAULT_NAMESPACE, String::new())
    }
}

impl Pod {
    /// Assigns a fresh uid and derives the final name from it, per spec.md
    /// §3: "Name defaults to `name` prefixed with a fragment of the uid to
    /// allow repeat submissions."
    pub fn assign_identity(&mut self) {
        let uid = uuid::Uuid::new_v4().to_string();
        let fragment = &uid[..8];
        self.metadata.name = format!("{}-{}", fragment, self.metadata.name);
        self.metadata.uid = uid;
    }

    pub fn is_scheduled(&self) -> bool {
        !self.spec.node_name.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn assign_identity_gives_distinct_names_for_repeat_submissions() {
        let mut a = Pod {
            metadata: Metadata::new("default", "nginx"),
            spec: PodSpec::default(),
            status: PodStatus::default(),
        };
        let mut b = a.clone();
        a.assign_identity();
        b.assign_identity();
        assert_ne!(a.metadata.uid, b.metadata.uid);
        assert_ne!(a.metadata.name, b.metadata.name);
        assert!(a.metadata.name.ends_with("-nginx"));
    }

    #[test]
    fn pending_pod_is_not_scheduled() {
        let pod = Pod {
            metadata: Metadata::new("default", "nginx"),
            spec: PodSpec::default(),
            status: PodStatus::default(),
        };
        assert!(!pod.is_scheduled());
    }

    #[test]
    fn default_phase_is_pending() {
        assert_eq!(PodPhase::default(), PodPhase::Pending);
    }
}
