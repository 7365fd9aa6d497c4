//! The node agent's control loops, grounded on
//! `original_source/agent/node_agent.go`'s `NodeAgent`: `Start` (register +
//! spawn heartbeat and reconcile goroutines), `startHeartbeat`, and
//! `monitorAndManagePods`.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use nanokube_client::Client;
use nanokube_runtime::ContainerRuntime;
use nanokube_types::{Node, NodeCondition, NodePhase, NodeStatus, Pod, PodPhase, Service};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::AgentError;
use crate::ports::AssignedPortAllocator;
use crate::{capacity, containers, server, table};

/// One node agent process. `previousPods` from the original source is
/// deliberately *not* a field here: it's only read and written by the
/// reconcile loop, so it lives as a local variable in
/// [`Agent::run_reconcile_loop`] instead of behind a lock everyone else
/// has to pay for.
pub struct Agent {
    client: Client,
    runtime: Arc<dyn ContainerRuntime>,
    node_name: String,
    node_ip: String,
    assigned_ports: AssignedPortAllocator,
    local_view: RwLock<Vec<Pod>>,
}

impl Agent {
    pub fn new(node_name: String, node_ip: String, client: Client, runtime: Arc<dyn ContainerRuntime>) -> Self {
        Agent {
            client,
            runtime,
            node_name,
            node_ip,
            assigned_ports: AssignedPortAllocator::new(),
            local_view: RwLock::new(Vec::new()),
        }
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// Registers this host as a Ready Node with a freshly probed capacity,
    /// per spec.md §4.4. Called once at startup.
    pub async fn register(&self) -> Result<(), AgentError> {
        let mut node = Node::new(self.node_name.clone(), self.node_ip.clone());
        node.status = self.node_status();
        self.client.register_node(&node).await?;
        info!(node = %self.node_name, ip = %self.node_ip, "registered node");
        Ok(())
    }

    fn node_status(&self) -> NodeStatus {
        NodeStatus {
            phase: NodePhase::Ready,
            last_heartbeat: Some(Utc::now()),
            conditions: vec![NodeCondition {
                kind: "Ready".to_string(),
                status: "True".to_string(),
                last_update_time: Utc::now(),
            }],
            capacity: capacity::probe(),
        }
    }

    /// Spawns the heartbeat loop and the local debugging HTTP surface, then
    /// blocks forever running the Pod reconcile loop in the foreground —
    /// same "one foreground loop, rest spawned" shape as
    /// `nanokube_scheduler::Scheduler::run`.
    pub async fn run(self: Arc<Self>, heartbeat_interval: Duration, reconcile_interval: Duration, local_addr: SocketAddr) {
        let heartbeat_agent = self.clone();
        tokio::spawn(async move {
            heartbeat_agent.run_heartbeat_loop(heartbeat_interval).await;
        });

        let server_agent = self.clone();
        tokio::spawn(async move {
            server::run(server_agent, local_addr).await;
        });

        self.run_reconcile_loop(reconcile_interval).await;
    }

    pub async fn run_heartbeat_loop(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(err) = self.heartbeat_tick().await {
                warn!(error = %err, "heartbeat failed");
            }
        }
    }

    async fn heartbeat_tick(&self) -> Result<(), AgentError> {
        let status = self.node_status();
        self.client.update_node_status(&self.node_name, &status).await?;
        Ok(())
    }

    pub async fn run_reconcile_loop(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        let mut tracked: HashSet<String> = HashSet::new();
        loop {
            ticker.tick().await;
            tracked = self.reconcile_tick(tracked).await;
        }
    }

    /// One pass of spec.md §4.4's loop. `previous` is the set of container
    /// names tracked as of the last tick; the returned set carries forward
    /// every currently-assigned Pod plus any cleanup that failed and must
    /// be retried.
    async fn reconcile_tick(&self, previous: HashSet<String>) -> HashSet<String> {
        let pods = match self.client.list_pods_on_node(&self.node_name).await {
            Ok(pods) => pods,
            Err(err) => {
                warn!(error = %err, "failed to list pods for this node");
                return previous;
            }
        };
        let services = match self.client.list_services("").await {
            Ok(services) => services,
            Err(err) => {
                warn!(error = %err, "failed to list services");
                Vec::new()
            }
        };

        let mut current: HashSet<String> = HashSet::new();
        let mut view = Vec::with_capacity(pods.len());
        for mut pod in pods {
            current.insert(pod.metadata.name.clone());
            self.reconcile_pod(&mut pod, &services).await;
            view.push(pod);
        }
        *self.local_view.write().await = view;

        let mut next = current.clone();
        for name in previous.difference(&current) {
            match self.cleanup_container(name).await {
                Ok(()) => self.assigned_ports.release(name),
                Err(()) => {
                    next.insert(name.clone());
                }
            }
        }
        next
    }

    /// Per spec.md §4.4's container start contract: a container is always
    /// named after its Pod, so inspection keys on `pod.metadata.name`.
    async fn reconcile_pod(&self, pod: &mut Pod, services: &[Service]) {
        let container_name = pod.metadata.name.clone();
        let inspection = match self.runtime.inspect(&container_name).await {
            Ok(inspection) => inspection,
            Err(err) => {
                warn!(error = %err, pod = %container_name, "failed to inspect container");
                return;
            }
        };

        match table::next_action(pod.status.phase, inspection.running) {
            table::Action::NoOp => {}
            table::Action::Start => self.start_pod(pod, services).await,
            table::Action::SyncRunning => {
                pod.status.phase = PodPhase::Running;
                pod.status.host_ip = self.node_ip.clone();
                if let Some(id) = &inspection.id {
                    pod.status.container_id = id.clone();
                }
                self.persist_status(pod).await;
            }
            table::Action::MarkFailed => {
                pod.status.phase = PodPhase::Failed;
                self.persist_status(pod).await;
            }
        }
    }

    async fn start_pod(&self, pod: &mut Pod, services: &[Service]) {
        let Some(container) = pod.spec.containers.first().cloned() else {
            warn!(pod = %pod.metadata.name, "pod has no containers, nothing to start");
            return;
        };

        let matches = containers::matching_node_port_services(pod, services);
        match pod.status.assigned_port {
            Some(port) => self.assigned_ports.adopt(&pod.metadata.name, port),
            None if !matches.is_empty() => {
                pod.status.assigned_port = self.assigned_ports.allocate_for(&pod.metadata.name);
            }
            None => {}
        }
        let port_mappings = pod
            .status
            .assigned_port
            .and_then(|port| containers::port_mapping_for(port, &matches))
            .into_iter()
            .collect::<Vec<_>>();

        let spec = containers::build_container_spec(pod, &container, port_mappings);
        match self.runtime.create_and_start(&spec).await {
            Ok(id) => {
                pod.status.container_id = id;
                pod.status.phase = PodPhase::Running;
                pod.status.host_ip = self.node_ip.clone();
                pod.status.start_time = Some(Utc::now());
            }
            Err(err) => {
                warn!(error = %err, pod = %pod.metadata.name, "failed to start container");
                pod.status.phase = PodPhase::Failed;
            }
        }
        self.persist_status(pod).await;
    }

    async fn persist_status(&self, pod: &Pod) {
        if let Err(err) = self.client.update_pod_status(&pod.metadata.name, &pod.status).await {
            warn!(error = %err, pod = %pod.metadata.name, "failed to persist pod status");
        }
    }

    /// Stop then remove; idempotent on an already-absent container. On
    /// failure the name is kept in the tracked set so the next tick
    /// retries, per spec.md §4.4's cleanup note.
    async fn cleanup_container(&self, name: &str) -> Result<(), ()> {
        if let Err(err) = self.runtime.stop(name).await {
            warn!(error = %err, pod = %name, "failed to stop container, will retry");
            return Err(());
        }
        if let Err(err) = self.runtime.remove(name).await {
            warn!(error = %err, pod = %name, "failed to remove container, will retry");
            return Err(());
        }
        Ok(())
    }

    /// The reconcile loop's last-seen view of Pods on this node, read by
    /// the local `/pods` debugging endpoint.
    pub async fn local_pods(&self) -> Vec<Pod> {
        self.local_view.read().await.clone()
    }
}
