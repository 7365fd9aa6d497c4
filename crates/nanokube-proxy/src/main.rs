use std::sync::Arc;
use std::time::Duration;

use nanokube_client::{Client, ClientConfig};
use nanokube_proxy::ProxyTable;

/// How long open listeners are given to drain in-flight connections before
/// the process exits, per spec.md §4.5's shutdown note.
const SHUTDOWN_DRAIN: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    #[cfg(feature = "cli")]
    let config = nanokube_proxy::Config::new_from_flags();
    #[cfg(not(feature = "cli"))]
    let config = nanokube_proxy::Config::from_env();

    let client = Client::new(ClientConfig {
        host: config.api_host.clone(),
        port: config.api_port,
    });
    let table = Arc::new(ProxyTable::new(config.bind_ip, client));

    tokio::spawn(table.clone().run(Duration::from_secs(10)));

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down, draining connections");
    table.shutdown(SHUTDOWN_DRAIN).await;
    Ok(())
}
