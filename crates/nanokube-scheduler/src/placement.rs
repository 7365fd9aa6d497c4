//! Pure placement policy: least-loaded, round-robin tie-break (spec.md
//! §4.3). Kept free of any I/O so it can be exhaustively unit tested
//! without a running API server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use nanokube_types::{Node, NodePhase};

/// Picks the Ready node with the fewest pods already assigned to it,
/// breaking ties by advancing `counter` round-robin over the tied,
/// alphabetically-sorted candidates. Returns `None` if there are no Ready
/// nodes.
pub fn pick_node(nodes: &[Node], pod_counts: &HashMap<String, u32>, counter: &AtomicU64) -> Option<String> {
    let mut ready: Vec<&str> = nodes
        .iter()
        .filter(|n| n.status.phase == NodePhase::Ready)
        .map(|n| n.name.as_str())
        .collect();
    if ready.is_empty() {
        return None;
    }
    ready.sort_unstable();

    let min_count = ready
        .iter()
        .map(|name| pod_counts.get(*name).copied().unwrap_or(0))
        .min()
        .unwrap_or(0);
    let tied: Vec<&str> = ready
        .into_iter()
        .filter(|name| pod_counts.get(*name).copied().unwrap_or(0) == min_count)
        .collect();

    let idx = (counter.fetch_add(1, Ordering::Relaxed) as usize) % tied.len();
    Some(tied[idx].to_string())
}

/// Counts how many Pods currently list each node as `spec.node_name`.
pub fn count_pods_per_node(pods: &[nanokube_types::Pod]) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for pod in pods {
        if !pod.spec.node_name.is_empty() {
            *counts.entry(pod.spec.node_name.clone()).or_insert(0) += 1;
        }
    }
    counts
}
