//! The supervisory refresh loop, per spec.md §4.5: every tick, re-list
//! NodePort Services and Pods, open listeners for newly-seen Services,
//! close listeners for Services that disappeared, and atomically swap
//! backends for the ones still around. Grounded on
//! `original_source/proxy/service_updater.go`'s `watchServices` /
//! `updateServices` / `CleanupServices`.

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use nanokube_client::{Client, ClientError};
use nanokube_types::Service;
use tokio::sync::{oneshot, RwLock};
use tracing::{info, warn};

use crate::backend::{backends_for, infer_mode, ProxyMode};
use crate::listener;
use crate::service_proxy::ServiceProxy;

struct OpenListener {
    proxy: Arc<ServiceProxy>,
    shutdown: oneshot::Sender<()>,
}

/// Owns every live listener, keyed by `nodePort`. Mutated under a single
/// read-write lock, per spec.md §4.5's "a supervisory refresh task that
/// mutates the service map under a read-write lock" note.
pub struct ProxyTable {
    bind_ip: IpAddr,
    client: Client,
    listeners: RwLock<HashMap<u16, OpenListener>>,
}

impl ProxyTable {
    pub fn new(bind_ip: IpAddr, client: Client) -> Self {
        ProxyTable {
            bind_ip,
            client,
            listeners: RwLock::new(HashMap::new()),
        }
    }

    pub async fn run(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(err) = self.refresh_tick().await {
                warn!(error = %err, "proxy refresh tick failed");
            }
        }
    }

    pub async fn refresh_tick(&self) -> Result<(), ClientError> {
        let services = self.client.list_services("").await?;
        let pods = self.client.list_pods("").await?;
        let node_port_services: Vec<&Service> = services.iter().filter(|s| s.is_node_port()).collect();

        let mut seen: HashSet<u16> = HashSet::new();
        for service in &node_port_services {
            let Some(port) = service.spec.ports.first() else { continue };
            let Some(node_port) = port.node_port else { continue };
            seen.insert(node_port);
            let backends = backends_for(service, &pods);
            self.sync_listener(node_port, port, service, backends).await;
        }

        self.close_removed(&seen).await;
        Ok(())
    }

    async fn sync_listener(
        &self,
        node_port: u16,
        port: &nanokube_types::ServicePort,
        service: &Service,
        backends: Vec<crate::backend::Backend>,
    ) {
        {
            let listeners = self.listeners.read().await;
            if let Some(existing) = listeners.get(&node_port) {
                existing.proxy.set_backends(backends);
                return;
            }
        }

        let proxy = Arc::new(ServiceProxy::new(backends));
        let (tx, rx) = oneshot::channel();
        let addr = SocketAddr::new(self.bind_ip, node_port);
        match infer_mode(port) {
            ProxyMode::Http => {
                tokio::spawn(listener::serve_http(addr, proxy.clone(), rx));
            }
            ProxyMode::Tcp => {
                tokio::spawn(listener::serve_tcp(addr, proxy.clone(), rx));
            }
        }
        info!(node_port, service = %service.metadata.name, "opened proxy listener");
        self.listeners
            .write()
            .await
            .insert(node_port, OpenListener { proxy, shutdown: tx });
    }

    async fn close_removed(&self, seen: &HashSet<u16>) {
        let mut listeners = self.listeners.write().await;
        let removed: Vec<u16> = listeners.keys().filter(|port| !seen.contains(port)).copied().collect();
        for port in removed {
            if let Some(listener) = listeners.remove(&port) {
                info!(node_port = port, "closing proxy listener for removed service");
                let _ = listener.shutdown.send(());
            }
        }
    }

    /// Closes every open listener and waits out a drain window so in-flight
    /// connections get a chance to finish, per spec.md §4.5's shutdown note.
    pub async fn shutdown(&self, drain: Duration) {
        let mut listeners = self.listeners.write().await;
        for (_, listener) in listeners.drain() {
            let _ = listener.shutdown.send(());
        }
        drop(listeners);
        tokio::time::sleep(drain).await;
    }

    pub async fn listener_count(&self) -> usize {
        self.listeners.read().await.len()
    }
}
