use std::sync::Arc;
use std::time::Duration;

use nanokube_client::{Client, ClientConfig};
use nanokube_scheduler::{Config, Scheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    #[cfg(feature = "cli")]
    let config = Config::new_from_flags();
    #[cfg(not(feature = "cli"))]
    let config = Config::from_env();

    let client = Client::new(ClientConfig {
        host: config.api_host,
        port: config.api_port,
    });
    let scheduler = Arc::new(Scheduler::new(client));
    scheduler.run(Duration::from_secs(5), Duration::from_secs(60)).await;
    Ok(())
}
