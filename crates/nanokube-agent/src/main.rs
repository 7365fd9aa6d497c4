use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use nanokube_client::{Client, ClientConfig};
use nanokube_runtime::DockerCliRuntime;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    #[cfg(feature = "cli")]
    let config = nanokube_agent::Config::new_from_flags();
    #[cfg(not(feature = "cli"))]
    let config = match nanokube_agent::Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "missing required configuration");
            std::process::exit(2);
        }
    };

    let client = Client::new(ClientConfig {
        host: config.api_host.clone(),
        port: config.api_port,
    });
    let runtime = Arc::new(DockerCliRuntime::new());
    let agent = Arc::new(nanokube_agent::Agent::new(
        config.node_name.clone(),
        config.node_ip.clone(),
        client,
        runtime,
    ));

    agent.register().await?;

    let local_addr = SocketAddr::new(config.agent_addr, config.agent_port);
    agent
        .run(Duration::from_secs(30), Duration::from_secs(10), local_addr)
        .await;
    Ok(())
}
