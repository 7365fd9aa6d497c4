//! A small per-node HTTP surface for operator debugging. **[ADDED]**,
//! grounded on `original_source/server/node_server.go`'s `/healthz`,
//! `/pods`, and `/metrics` routes — filter composition follows the
//! teacher's `crates/kubelet/src/webserver/mod.rs` (`a.or(b).or(c)`, one
//! handler function per route).
//!
//! Unlike the Go original's `watchForPods`, this doesn't run a second
//! competing reconciler: it only ever reads the one reconcile loop's
//! last-seen view (`Agent::local_pods`).

use std::net::SocketAddr;
use std::sync::Arc;

use warp::Filter;

use crate::Agent;

pub async fn run(agent: Arc<Agent>, addr: SocketAddr) {
    let routes = healthz().or(pods(agent.clone())).or(metrics());
    tracing::info!(%addr, node = %agent.node_name(), "nanokube-agent local http surface listening");
    warp::serve(routes).run(addr).await;
}

fn healthz() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path("healthz")
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({"status": "ok"})))
}

fn pods(agent: Arc<Agent>) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path("pods").and(warp::get()).and_then(move || {
        let agent = agent.clone();
        async move { Ok::<_, warp::Rejection>(warp::reply::json(&agent.local_pods().await)) }
    })
}

// TODO: Add node metrics collection
fn metrics() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path("metrics")
        .and(warp::get())
        .map(|| "metrics collection not implemented\n")
}

#[cfg(test)]
mod test {
    use super::*;
    use nanokube_client::{Client, ClientConfig};
    use nanokube_runtime::FakeRuntime;
    use std::sync::Arc;

    fn test_agent() -> Arc<Agent> {
        let client = Client::new(ClientConfig {
            host: "localhost".to_string(),
            port: 8080,
        });
        Arc::new(Agent::new(
            "n1".to_string(),
            "10.0.0.5".to_string(),
            client,
            Arc::new(FakeRuntime::new()),
        ))
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let routes = healthz().or(pods(test_agent())).or(metrics());
        let res = warp::test::request().method("GET").path("/healthz").reply(&routes).await;
        assert_eq!(res.status(), 200);
    }

    #[tokio::test]
    async fn pods_reports_empty_view_before_any_tick() {
        let routes = healthz().or(pods(test_agent())).or(metrics());
        let res = warp::test::request().method("GET").path("/pods").reply(&routes).await;
        assert_eq!(res.status(), 200);
        assert_eq!(res.body(), "[]");
    }

    #[tokio::test]
    async fn metrics_is_a_stub() {
        let routes = healthz().or(pods(test_agent())).or(metrics());
        let res = warp::test::request().method("GET").path("/metrics").reply(&routes).await;
        assert_eq!(res.status(), 200);
    }
}
