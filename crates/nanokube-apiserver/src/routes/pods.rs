//! `/api/v1/pods` and friends, per spec.md §4.2.

use std::collections::HashMap;
use std::sync::Arc;

use nanokube_store::{Kv, Store};
use nanokube_types::{Pod, PodStatus};

use crate::error::{reject, ApiError};

pub async fn list_pods<K: Kv>(
    query: HashMap<String, String>,
    store: Arc<Store<K>>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let pods = store.list_pods("").await.map_err(reject)?;
    let filtered = match query.get("fieldSelector") {
        Some(selector) => match selector.strip_prefix("spec.nodeName=") {
            Some(node_name) => pods
                .into_iter()
                .filter(|pod| pod.spec.node_name == node_name)
                .collect(),
            None => {
                return Err(warp::reject::custom(ApiError::Validation(format!(
                    "unsupported fieldSelector: {}",
                    selector
                ))))
            }
        },
        None => pods,
    };
    Ok(warp::reply::json(&filtered))
}

pub async fn list_pods_by_namespace<K: Kv>(
    namespace: String,
    store: Arc<Store<K>>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let pods = store.list_pods(&namespace).await.map_err(reject)?;
    Ok(warp::reply::json(&pods))
}

pub async fn get_pod<K: Kv>(name: String, store: Arc<Store<K>>) -> Result<impl warp::Reply, warp::Rejection> {
    match store.get_pod("default", &name).await.map_err(reject)? {
        Some(pod) => Ok(warp::reply::json(&pod)),
        None => Err(warp::reject::custom(ApiError::NotFound(format!("pod {}", name)))),
    }
}

pub async fn create_pod<K: Kv>(
    mut pod: Pod,
    store: Arc<Store<K>>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if pod.spec.containers.is_empty() {
        return Err(warp::reject::custom(ApiError::Validation(
            "pod must have at least one container".to_string(),
        )));
    }
    pod.assign_identity();
    pod.status = nanokube_types::pod::PodStatus {
        start_time: Some(chrono::Utc::now()),
        ..Default::default()
    };
    if store
        .get_pod(&pod.metadata.namespace, &pod.metadata.name)
        .await
        .map_err(reject)?
        .is_some()
    {
        return Err(warp::reject::custom(ApiError::Conflict(format!(
            "pod {} already exists",
            pod.metadata.name
        ))));
    }
    store.save_pod(&pod).await.map_err(reject)?;
    Ok(warp::reply::with_status(
        warp::reply::json(&pod),
        warp::http::StatusCode::CREATED,
    ))
}

pub async fn replace_pod<K: Kv>(
    namespace: String,
    name: String,
    mut pod: Pod,
    store: Arc<Store<K>>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let existing = store
        .get_pod(&namespace, &name)
        .await
        .map_err(reject)?
        .ok_or_else(|| warp::reject::custom(ApiError::NotFound(format!("pod {}", name))))?;
    pod.metadata.uid = existing.metadata.uid;
    pod.status = existing.status;
    store.save_pod(&pod).await.map_err(reject)?;
    Ok(warp::reply::json(&pod))
}

/// `PUT /api/v1/pods/{name}/status`: only `status` is replaced, the spec in
/// the store is untouched, per spec.md §4.2.
pub async fn update_pod_status<K: Kv>(
    name: String,
    status: PodStatus,
    store: Arc<Store<K>>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let mut existing = store
        .get_pod("default", &name)
        .await
        .map_err(reject)?
        .ok_or_else(|| warp::reject::custom(ApiError::NotFound(format!("pod {}", name))))?;
    existing.status = status;
    store.save_pod(&existing).await.map_err(reject)?;
    Ok(warp::reply::json(&existing))
}

/// Idempotent: deleting a Pod that does not exist is still a success, per
/// spec.md §7's "user-visible failures" note.
pub async fn delete_pod<K: Kv>(name: String, store: Arc<Store<K>>) -> Result<impl warp::Reply, warp::Rejection> {
    store.delete_pod("default", &name).await.map_err(reject)?;
    Ok(warp::reply::json(&serde_json::json!({
        "message": "pod deleted"
    })))
}
