//! The Service type: a stable endpoint selecting Pods by label equality.
//!
//! Mirrors `original_source/models/service.go`, wrapped in the same
//! `Metadata` the other resources use (the Go original split `Name`/
//! `Namespace` onto the struct directly; the Rust version unifies it with
//! Pod/Node for a single `Metadata` concept across the model).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ServiceType {
    ClusterIp,
    NodePort,
}

impl Default for ServiceType {
    fn default() -> Self {
        ServiceType::ClusterIp
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePort {
    pub port: u16,
    pub target_port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceSpec {
    #[serde(default)]
    pub service_type: ServiceType,
    #[serde(default)]
    pub selector: BTreeMap<String, String>,
    #[serde(default)]
    pub ports: Vec<ServicePort>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Service {
    pub metadata: crate::Metadata,
    #[serde(default)]
    pub spec: ServiceSpec,
}

/// The inclusive NodePort range spec.md §3 and §8 require: `[30000, 32767]`.
pub const NODE_PORT_RANGE: std::ops::RangeInclusive<u16> = 30000..=32767;

impl Service {
    pub fn is_node_port(&self) -> bool {
        matches!(self.spec.service_type, ServiceType::NodePort)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn node_port_range_matches_spec_bounds() {
        assert_eq!(*NODE_PORT_RANGE.start(), 30000);
        assert_eq!(*NODE_PORT_RANGE.end(), 32767);
    }
}
