//! Backend computation for NodePort Services, per spec.md §4.5: a
//! Service's backends are the Running Pods its selector matches.
//!
//! This system has no real pod network — `nanokube-runtime`'s
//! `DockerCliRuntime` publishes containers with `docker run -p
//! host:container`, so every backend is reached through its node's own
//! `hostIP:assignedPort`, for both data planes. `ProxyMode` only changes
//! how a connection is handled once accepted, not the target address.

use nanokube_types::selector::Selector;
use nanokube_types::{Pod, PodPhase, Service, ServicePort};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyMode {
    Http,
    Tcp,
}

/// Ports 80 and 443 get the HTTP data plane (request-level round robin,
/// `X-Forwarded-Host` rewriting); everything else is proxied as raw TCP
/// (connection-level round robin). **[ADDED]**: `ServicePort` carries no
/// explicit protocol field, so this resolves spec.md §9's open question of
/// how `ProxyMode` is chosen.
pub fn infer_mode(port: &ServicePort) -> ProxyMode {
    match port.port {
        80 | 443 => ProxyMode::Http,
        _ => ProxyMode::Tcp,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    pub host: String,
    pub port: u16,
}

/// Every Running Pod the Service's selector matches, each at
/// `hostIP:assignedPort`. A Pod with no `assignedPort` yet — not started,
/// or started before this Service existed — is skipped rather than routed
/// to with a bogus port.
pub fn backends_for(service: &Service, pods: &[Pod]) -> Vec<Backend> {
    let selector = Selector::new(&service.spec.selector);
    pods.iter()
        .filter(|pod| pod.status.phase == PodPhase::Running)
        .filter(|pod| selector.matches(&pod.metadata.labels))
        .filter_map(|pod| {
            pod.status.assigned_port.map(|port| Backend {
                host: pod.status.host_ip.clone(),
                port,
            })
        })
        .collect()
}
