//! `/api/v1/replicasets` CRUD. **[ADDED]**: spec.md treats ReplicaSet as
//! "part of the data model" but out of the reconciliation core's hot path;
//! this crate still needs to persist and list them so the supplemental
//! reconciler in `nanokube-scheduler` has something to read.

use std::sync::Arc;

use nanokube_store::{Kv, Store};
use nanokube_types::ReplicaSet;

use crate::error::reject;

pub async fn list_replicasets<K: Kv>(
    store: Arc<Store<K>>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let replicasets = store.list_replicasets("").await.map_err(reject)?;
    Ok(warp::reply::json(&replicasets))
}

pub async fn list_replicasets_by_namespace<K: Kv>(
    namespace: String,
    store: Arc<Store<K>>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let replicasets = store.list_replicasets(&namespace).await.map_err(reject)?;
    Ok(warp::reply::json(&replicasets))
}

pub async fn create_replicaset<K: Kv>(
    mut rs: ReplicaSet,
    store: Arc<Store<K>>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if rs.metadata.uid.is_empty() {
        rs.metadata.uid = uuid::Uuid::new_v4().to_string();
    }
    store.save_replicaset(&rs).await.map_err(reject)?;
    Ok(warp::reply::with_status(
        warp::reply::json(&rs),
        warp::http::StatusCode::CREATED,
    ))
}

pub async fn delete_replicaset<K: Kv>(
    namespace: String,
    name: String,
    store: Arc<Store<K>>,
) -> Result<impl warp::Reply, warp::Rejection> {
    store.delete_replicaset(&namespace, &name).await.map_err(reject)?;
    Ok(warp::reply::json(&serde_json::json!({
        "message": "replicaset deleted"
    })))
}
