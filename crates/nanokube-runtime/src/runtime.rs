//! The container runtime contract, per spec.md §6: `CreateAndStart` /
//! `Inspect` / `Stop` / `Remove` / `Logs`, abstracted over any local
//! container daemon.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::error::RuntimeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapping {
    pub host_port: u16,
    pub container_port: u16,
}

/// Resource caps and port mappings for a container start request. Memory
/// and CPU limits are already runtime-native strings (e.g. `512m`,
/// `1.500`) — unit translation happens in `nanokube_types::quantity`
/// before a `CreateAndStart` call is built.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub command: Option<Vec<String>>,
    pub memory_limit: String,
    pub cpu_limit: String,
    pub port_mappings: Vec<PortMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub exists: bool,
    pub running: bool,
    pub id: Option<String>,
}

impl Inspection {
    pub fn absent() -> Self {
        Inspection {
            exists: false,
            running: false,
            id: None,
        }
    }
}

pub type LogStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Creates and starts a container with the given name, which must be
    /// unique; returns the container id.
    async fn create_and_start(&self, spec: &ContainerSpec) -> Result<String, RuntimeError>;

    /// Never errors on an absent container; reports `exists=false` instead.
    async fn inspect(&self, name: &str) -> Result<Inspection, RuntimeError>;

    /// Graceful stop (SIGTERM, then SIGKILL after 10s); idempotent.
    async fn stop(&self, name: &str) -> Result<(), RuntimeError>;

    /// Removes a stopped container; idempotent.
    async fn remove(&self, name: &str) -> Result<(), RuntimeError>;

    async fn logs(&self, name: &str) -> Result<LogStream, RuntimeError>;
}
