//! `/api/v1/services`, per spec.md §4.2: NodePort range validation and
//! allocation on create (the allocator itself lives in `nanokube-store`,
//! shared with `nanokube-proxy`).

use std::sync::Arc;

use nanokube_store::{Kv, PortAllocator, Store};
use nanokube_types::{Service, ServiceType};

use crate::error::reject;

pub async fn list_services<K: Kv>(
    store: Arc<Store<K>>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let services = store.list_services("").await.map_err(reject)?;
    Ok(warp::reply::json(&services))
}

pub async fn list_services_by_namespace<K: Kv>(
    namespace: String,
    store: Arc<Store<K>>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let services = store.list_services(&namespace).await.map_err(reject)?;
    Ok(warp::reply::json(&services))
}

pub async fn create_service<K: Kv>(
    mut service: Service,
    store: Arc<Store<K>>,
    allocator: Arc<PortAllocator>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if matches!(service.spec.service_type, ServiceType::NodePort) {
        for port in &mut service.spec.ports {
            match port.node_port {
                Some(requested) => allocator.reserve(requested).await.map_err(reject)?,
                None => {
                    let allocated = allocator.allocate().await.map_err(reject)?;
                    port.node_port = Some(allocated);
                }
            }
        }
    }
    if service.metadata.uid.is_empty() {
        service.metadata.uid = uuid::Uuid::new_v4().to_string();
    }
    store.save_service(&service).await.map_err(reject)?;
    Ok(warp::reply::with_status(
        warp::reply::json(&service),
        warp::http::StatusCode::CREATED,
    ))
}

pub async fn delete_service<K: Kv>(
    namespace: String,
    name: String,
    store: Arc<Store<K>>,
    allocator: Arc<PortAllocator>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if let Some(service) = store.get_service(&namespace, &name).await.map_err(reject)? {
        for port in &service.spec.ports {
            if let Some(node_port) = port.node_port {
                allocator.release(node_port).await.map_err(reject)?;
            }
        }
    }
    store.delete_service(&namespace, &name).await.map_err(reject)?;
    Ok(warp::reply::json(&serde_json::json!({
        "message": "service deleted"
    })))
}
