//! The Node type: a worker host that runs containers.
//!
//! Mirrors `original_source/models/node.go`'s `Node`/`NodeStatus`/
//! `NodeCondition`, trimmed of the Go source's unused `NodeSpec`/
//! `NodeResources` duplication (spec.md's `capacity` already covers it).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ResourceList = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum NodePhase {
    Ready,
    NotReady,
}

impl Default for NodePhase {
    fn default() -> Self {
        NodePhase::NotReady
    }
}

impl std::fmt::Display for NodePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodePhase::Ready => f.write_str("Ready"),
            NodePhase::NotReady => f.write_str("NotReady"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCondition {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub last_update_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeStatus {
    #[serde(default)]
    pub phase: NodePhase,
    pub last_heartbeat: Option<DateTime<Utc>>,
    #[serde(default)]
    pub conditions: Vec<NodeCondition>,
    #[serde(default)]
    pub capacity: ResourceList,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub ip: String,
    #[serde(default)]
    pub spec: NodeSpec,
    #[serde(default)]
    pub status: NodeStatus,
}

impl Node {
    pub fn new(name: impl Into<String>, ip: impl Into<String>) -> Self {
        Node {
            name: name.into(),
            ip: ip.into(),
            spec: NodeSpec::default(),
            status: NodeStatus::default(),
        }
    }

    /// spec.md §3: a node becomes NotReady once its heartbeat is older than
    /// 3x the heartbeat interval (the deadline spec.md §9 settles on as the
    /// source's missing readiness timeout).
    pub fn is_stale(&self, heartbeat_interval: std::time::Duration, now: DateTime<Utc>) -> bool {
        match self.status.last_heartbeat {
            None => true,
            Some(last) => {
                let deadline = heartbeat_interval * 3;
                match (now - last).to_std() {
                    Ok(elapsed) => elapsed > deadline,
                    Err(_) => false,
                }
            }
        }
    }
}
