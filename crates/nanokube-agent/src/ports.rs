//! A per-node allocator for `Pod.status.assignedPort`. **[ADDED]**,
//! distinct from the NodePort allocator in `nanokube-store`: a NodePort
//! must be unique cluster-wide (the API server owns that one, shared with
//! the outside world), but an `assignedPort` only needs to be unique on
//! the node that issued it, since the proxy always reaches it through
//! that node's own `hostIP`. Each agent therefore keeps its own local,
//! unpersisted pool rather than coordinating through the shared KV store.

use std::collections::{BTreeSet, HashMap};
use std::ops::RangeInclusive;
use std::sync::Mutex;

const ASSIGNED_PORT_RANGE: RangeInclusive<u16> = 40000..=49999;

#[derive(Default)]
struct State {
    used: BTreeSet<u16>,
    owners: HashMap<String, u16>,
}

#[derive(Default)]
pub struct AssignedPortAllocator {
    state: Mutex<State>,
}

impl AssignedPortAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the Pod's existing port if it already owns one, otherwise
    /// allocates the lowest free port in range. `None` only on exhaustion.
    pub fn allocate_for(&self, pod_name: &str) -> Option<u16> {
        let mut state = self.state.lock().expect("assigned port allocator poisoned");
        if let Some(port) = state.owners.get(pod_name) {
            return Some(*port);
        }
        let port = ASSIGNED_PORT_RANGE.into_iter().find(|p| !state.used.contains(p))?;
        state.used.insert(port);
        state.owners.insert(pod_name.to_string(), port);
        Some(port)
    }

    /// Records a port the API server already reports for this Pod (from a
    /// prior tick, or after this process restarted) without reallocating,
    /// so it's never handed out to a second Pod.
    pub fn adopt(&self, pod_name: &str, port: u16) {
        let mut state = self.state.lock().expect("assigned port allocator poisoned");
        state.used.insert(port);
        state.owners.insert(pod_name.to_string(), port);
    }

    pub fn release(&self, pod_name: &str) {
        let mut state = self.state.lock().expect("assigned port allocator poisoned");
        if let Some(port) = state.owners.remove(pod_name) {
            state.used.remove(&port);
        }
    }
}
