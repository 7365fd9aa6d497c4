//! The ReplicaSet type and its template, per spec.md §3.
//!
//! Mirrors `original_source/models/replicaSet.go`. The reconciler that
//! uses this type lives in `nanokube-scheduler` (SPEC_FULL.md §3 ADDED);
//! this module only carries the data shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelSelector {
    #[serde(default)]
    pub match_labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodTemplateSpec {
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodTemplate {
    #[serde(default)]
    pub metadata: PodTemplateSpec,
    pub spec: crate::PodSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplicaSetSpec {
    pub replicas: u32,
    #[serde(default)]
    pub selector: LabelSelector,
    pub template: PodTemplate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplicaSetStatus {
    #[serde(default)]
    pub replicas: u32,
    #[serde(default)]
    pub ready_replicas: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplicaSet {
    pub metadata: crate::Metadata,
    pub spec: ReplicaSetSpec,
    #[serde(default)]
    pub status: ReplicaSetStatus,
}
