//! The nanokube REST API server (spec.md §4.2): the single source of
//! truth the scheduler, node agent, and proxy all read and write through.

pub mod config;
pub mod error;
pub mod heartbeat;
pub mod routes;

#[cfg(test)]
mod tests;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use nanokube_store::{Kv, PortAllocator, Store};

pub use config::Config;

/// Starts the HTTP server plus the heartbeat sweep task, and blocks until
/// a shutdown signal arrives. Mirrors the teacher's `webserver::start`
/// shape (`crates/kubelet/src/webserver/mod.rs`): `warp::serve(routes).run(addr)`.
pub async fn run<K: Kv + 'static>(config: Config, store: Arc<Store<K>>) -> anyhow::Result<()> {
    let allocator = Arc::new(PortAllocator::new(store.kv_arc()));
    run_with_allocator(config, store, allocator).await
}

/// Like [`run`], but takes an explicit allocator so a single-process demo
/// binary can share one allocator (and one KV) across the API server and
/// the proxy.
pub async fn run_with_allocator<K: Kv + 'static>(
    config: Config,
    store: Arc<Store<K>>,
    allocator: Arc<PortAllocator>,
) -> anyhow::Result<()> {
    let routes = routes::build_routes(store.clone(), allocator);
    let addr = SocketAddr::new(config.addr, config.port);

    let sweep_store = store.clone();
    tokio::spawn(async move {
        heartbeat::run(sweep_store, Duration::from_secs(30), Duration::from_secs(10)).await;
    });

    tracing::info!(%addr, "nanokube-apiserver listening");
    warp::serve(routes).run(addr).await;
    Ok(())
}
