//! The nanokube scheduler (spec.md §4.3): assigns `spec.nodeName` to
//! unscheduled Pods, plus a supplemental ReplicaSet-filling loop
//! (SPEC_FULL.md §3 ADDED).

pub mod config;
pub mod error;
pub mod placement;
pub mod replicaset;

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

use nanokube_client::Client;
use tracing::{info, warn};

pub use config::Config;
pub use error::SchedulerError;

/// Holds the one piece of shared mutable state the placement loop needs
/// (the round-robin tie-break counter); everything else is re-fetched from
/// the API server each tick, per spec.md §5's "no shared mutable state
/// beyond the node-index counter" note.
pub struct Scheduler {
    client: Client,
    tie_break: AtomicU64,
}

impl Scheduler {
    pub fn new(client: Client) -> Self {
        Scheduler {
            client,
            tie_break: AtomicU64::new(0),
        }
    }

    /// Spawns the ReplicaSet-filling loop and blocks forever running the Pod
    /// placement loop, matching the teacher's pattern of one foreground
    /// loop plus spawned background tasks (`nanokube_apiserver::run`).
    pub async fn run(self: Arc<Self>, pod_interval: Duration, replicaset_interval: Duration) {
        let rs_scheduler = self.clone();
        tokio::spawn(async move {
            rs_scheduler.run_replicaset_loop(replicaset_interval).await;
        });
        self.run_placement_loop(pod_interval).await;
    }

    pub async fn run_placement_loop(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(err) = self.schedule_tick().await {
                warn!(error = %err, "scheduler tick failed");
            }
        }
    }

    pub async fn run_replicaset_loop(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(err) = self.replicaset_tick().await {
                warn!(error = %err, "replicaset reconcile tick failed");
            }
        }
    }

    /// One pass of spec.md §4.3's loop: list Pods and Nodes, place every
    /// unscheduled Pending Pod. A failed PUT is logged and retried next
    /// tick, never propagated past this function.
    async fn schedule_tick(&self) -> Result<(), SchedulerError> {
        let pods = self.client.list_pods("").await?;
        let nodes = self.client.list_nodes().await?;
        let pod_counts = placement::count_pods_per_node(&pods);

        for mut pod in pods {
            if pod.status.phase != nanokube_types::PodPhase::Pending || !pod.spec.node_name.is_empty() {
                continue;
            }
            match placement::pick_node(&nodes, &pod_counts, &self.tie_break) {
                Some(node_name) => {
                    pod.spec.node_name = node_name.clone();
                    let namespace = pod.metadata.namespace.clone();
                    let name = pod.metadata.name.clone();
                    match self.client.replace_pod(&namespace, &name, &pod).await {
                        Ok(()) => info!(pod = %name, node = %node_name, "scheduled pod"),
                        Err(err) => warn!(error = %err, pod = %name, "failed to persist scheduling decision"),
                    }
                }
                None => {
                    info!(pod = %pod.metadata.name, "no Ready nodes available, leaving pod Pending");
                }
            }
        }
        Ok(())
    }

    async fn replicaset_tick(&self) -> Result<(), SchedulerError> {
        let replicasets = self.client.list_replicasets("").await?;
        let pods = self.client.list_pods("").await?;

        for mut rs in replicasets {
            let matched: Vec<nanokube_types::Pod> = replicaset::matching_pods(&rs, &pods)
                .into_iter()
                .cloned()
                .collect();
            let recon = replicaset::reconcile(&rs, &matched);

            for _ in 0..recon.to_create {
                let pod = replicaset::pod_from_template(&rs);
                if let Err(err) = self.client.create_pod(&pod).await {
                    warn!(error = %err, replicaset = %rs.metadata.name, "failed to create pod from template");
                }
            }

            rs.status.replicas = recon.replicas + recon.to_create;
            rs.status.ready_replicas = recon.ready_replicas;
            if let Err(err) = self.client.upsert_replicaset(&rs).await {
                warn!(error = %err, replicaset = %rs.metadata.name, "failed to persist replicaset status");
            }
        }
        Ok(())
    }
}
