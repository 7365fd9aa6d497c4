use std::sync::Arc;

use nanokube_store::{InMemoryKv, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    #[cfg(feature = "cli")]
    let config = nanokube_apiserver::Config::new_from_flags();
    #[cfg(not(feature = "cli"))]
    let config = nanokube_apiserver::Config::from_env();

    let store = Arc::new(Store::new(InMemoryKv::new()));
    nanokube_apiserver::run(config, store).await
}
