//! An in-memory `ContainerRuntime` double for control-loop tests that
//! don't need a real daemon — mirrors `DockerCliRuntime`'s contract
//! without shelling out.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::RuntimeError;
use crate::runtime::{ContainerRuntime, ContainerSpec, Inspection, LogStream};

#[derive(Debug, Clone)]
struct FakeContainer {
    id: String,
    running: bool,
    spec: ContainerSpec,
}

#[derive(Default)]
pub struct FakeRuntime {
    containers: Mutex<BTreeMap<String, FakeContainer>>,
    next_id: Mutex<u64>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.containers
            .lock()
            .expect("fake runtime poisoned")
            .get(name)
            .map(|c| c.running)
            .unwrap_or(false)
    }
}

#[async_trait::async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn create_and_start(&self, spec: &ContainerSpec) -> Result<String, RuntimeError> {
        let mut containers = self.containers.lock().expect("fake runtime poisoned");
        if containers.contains_key(&spec.name) {
            return Err(RuntimeError::DuplicateName(spec.name.clone()));
        }
        let mut next_id = self.next_id.lock().expect("fake runtime poisoned");
        *next_id += 1;
        let id = format!("fake-{}", next_id);
        containers.insert(
            spec.name.clone(),
            FakeContainer {
                id: id.clone(),
                running: true,
                spec: spec.clone(),
            },
        );
        Ok(id)
    }

    async fn inspect(&self, name: &str) -> Result<Inspection, RuntimeError> {
        let containers = self.containers.lock().expect("fake runtime poisoned");
        Ok(match containers.get(name) {
            Some(container) => Inspection {
                exists: true,
                running: container.running,
                id: Some(container.id.clone()),
            },
            None => Inspection::absent(),
        })
    }

    async fn stop(&self, name: &str) -> Result<(), RuntimeError> {
        let mut containers = self.containers.lock().expect("fake runtime poisoned");
        if let Some(container) = containers.get_mut(name) {
            container.running = false;
        }
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), RuntimeError> {
        self.containers.lock().expect("fake runtime poisoned").remove(name);
        Ok(())
    }

    async fn logs(&self, name: &str) -> Result<LogStream, RuntimeError> {
        let containers = self.containers.lock().expect("fake runtime poisoned");
        let exists = containers.contains_key(name);
        drop(containers);
        if !exists {
            return Err(RuntimeError::Backend(format!("no such container: {}", name)));
        }
        Ok(Box::pin(futures::stream::empty()))
    }
}
