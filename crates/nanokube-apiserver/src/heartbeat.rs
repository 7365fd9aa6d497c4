//! Node heartbeat staleness sweep. **[ADDED]**: the API server, not the
//! agent, decides a Node has gone NotReady, since the agent that owns the
//! heartbeat cannot observe its own silence.

use std::sync::Arc;
use std::time::Duration;

use nanokube_store::{Kv, Store};
use nanokube_types::NodePhase;
use tracing::{info, warn};

/// Runs forever, sweeping every `sweep_interval` and flipping any Node
/// whose heartbeat is older than `3 * heartbeat_interval` to `NotReady`.
/// Publishes no event: node status changes are polled, not watched, per
/// the store's "not linearizable" stance.
pub async fn run<K: Kv + 'static>(
    store: Arc<Store<K>>,
    heartbeat_interval: Duration,
    sweep_interval: Duration,
) {
    let mut ticker = tokio::time::interval(sweep_interval);
    loop {
        ticker.tick().await;
        let nodes = match store.list_nodes().await {
            Ok(nodes) => nodes,
            Err(err) => {
                warn!(error = %err, "heartbeat sweep: failed to list nodes");
                continue;
            }
        };
        let now = chrono::Utc::now();
        for mut node in nodes {
            if node.status.phase == NodePhase::Ready && node.is_stale(heartbeat_interval, now) {
                node.status.phase = NodePhase::NotReady;
                info!(node = %node.name, "node heartbeat stale, marking NotReady");
                if let Err(err) = store.save_node(&node).await {
                    warn!(error = %err, node = %node.name, "failed to persist NotReady status");
                }
            }
        }
    }
}
