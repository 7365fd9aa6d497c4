//! Shared data model for the nanokube control plane.
//!
//! This crate has no I/O of its own: it is the vocabulary that the store,
//! API server, scheduler, node agent, and proxy all share, plus the small
//! amount of pure logic (label selector matching, resource quantity
//! conversion) that more than one of those components would otherwise have
//! to duplicate.

pub mod node;
pub mod pod;
pub mod quantity;
pub mod replicaset;
pub mod selector;
pub mod service;

pub use node::{Node, NodeCondition, NodePhase, NodeSpec, NodeStatus, ResourceList};
pub use pod::{
    Container, ContainerResources, Metadata, Pod, PodPhase, PodSpec, PodStatus,
};
pub use replicaset::{LabelSelector, PodTemplate, PodTemplateSpec, ReplicaSet, ReplicaSetSpec, ReplicaSetStatus};
pub use selector::Selector;
pub use service::{Service, ServicePort, ServiceSpec, ServiceType};

/// The kind of a resource, used to pick a key prefix and to discriminate a
/// JSON body before dispatch where a single endpoint is genuinely
/// polymorphic (see SPEC_FULL.md's note on tagged variants). Each HTTP
/// route in nanokube-apiserver is resource-typed already, so in practice
/// this enum is only exercised by tests and by any future multi-kind
/// endpoint.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind")]
pub enum Resource {
    Pod(Pod),
    Service(Service),
    ReplicaSet(ReplicaSet),
}

impl Resource {
    pub fn kind_str(&self) -> &'static str {
        match self {
            Resource::Pod(_) => "pods",
            Resource::Service(_) => "services",
            Resource::ReplicaSet(_) => "replicasets",
        }
    }
}

pub const DEFAULT_NAMESPACE: &str = "default";

/// Normalizes an empty namespace to `default`, per the store's key-schema
/// invariant: "a namespace omitted on write defaults to `default`".
pub fn normalize_namespace(namespace: &str) -> &str {
    if namespace.is_empty() {
        DEFAULT_NAMESPACE
    } else {
        namespace
    }
}
