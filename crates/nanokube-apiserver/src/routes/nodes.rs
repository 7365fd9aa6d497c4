//! `/api/v1/nodes`, per spec.md §4.2 and §4.4's registration/heartbeat
//! contract.

use std::sync::Arc;

use nanokube_store::{Kv, Store};
use nanokube_types::{Node, NodeStatus};

use crate::error::reject;

pub async fn list_nodes<K: Kv>(store: Arc<Store<K>>) -> Result<impl warp::Reply, warp::Rejection> {
    let nodes = store.list_nodes().await.map_err(reject)?;
    Ok(warp::reply::json(&nodes))
}

pub async fn register_node<K: Kv>(
    mut node: Node,
    store: Arc<Store<K>>,
) -> Result<impl warp::Reply, warp::Rejection> {
    node.status.last_heartbeat = Some(chrono::Utc::now());
    node.status.phase = nanokube_types::NodePhase::Ready;
    store.save_node(&node).await.map_err(reject)?;
    Ok(warp::reply::with_status(
        warp::reply::json(&node),
        warp::http::StatusCode::CREATED,
    ))
}

pub async fn update_node_status<K: Kv>(
    name: String,
    status: NodeStatus,
    store: Arc<Store<K>>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let mut node = store
        .get_node(&name)
        .await
        .map_err(reject)?
        .ok_or_else(|| warp::reject::custom(crate::error::ApiError::NotFound(format!("node {}", name))))?;
    node.status = status;
    store.save_node(&node).await.map_err(reject)?;
    Ok(warp::reply::json(&node))
}
