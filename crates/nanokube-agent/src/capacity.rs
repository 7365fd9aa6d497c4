//! Host capacity probing, per spec.md §4.4: a Node's `status.capacity` is
//! populated once at registration and refreshed on every heartbeat.
//!
//! `original_source/agent/node_agent.go`'s `getNodeCapacity` shells out to
//! `nproc` and `free -m`; this uses `sysinfo` instead, matching
//! `vectordotdev-vector`'s use of the same crate for host metrics rather
//! than hand-rolling another process spawn.

use nanokube_types::node::ResourceList;
use sysinfo::System;

pub fn probe() -> ResourceList {
    let mut system = System::new_all();
    system.refresh_all();

    let cpus = system.cpus().len().max(1);
    let memory_mi = (system.total_memory() / (1024 * 1024)).max(1);

    let mut capacity = ResourceList::new();
    capacity.insert("cpu".to_string(), cpus.to_string());
    capacity.insert("memory".to_string(), format!("{}Mi", memory_mi));
    capacity
}
