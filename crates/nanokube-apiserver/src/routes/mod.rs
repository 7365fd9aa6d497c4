pub mod healthz;
pub mod nodes;
pub mod pods;
pub mod replicasets;
pub mod services;

use std::collections::HashMap;
use std::sync::Arc;

use nanokube_store::{Kv, PortAllocator, Store};
use warp::Filter;

fn with_store<K: Kv + 'static>(
    store: Arc<Store<K>>,
) -> impl Filter<Extract = (Arc<Store<K>>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || store.clone())
}

fn with_allocator(
    allocator: Arc<PortAllocator>,
) -> impl Filter<Extract = (Arc<PortAllocator>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || allocator.clone())
}

/// Composes every route as `warp::Filter`s chained with `.or()`, in the
/// same shape as the teacher's `webserver/mod.rs`
/// (`ping.or(health).or(logs).or(exec)`) — handlers are free functions
/// taking shared state via `warp::any().map(...)`, not methods on a
/// router struct.
pub fn build_routes<K: Kv + 'static>(
    store: Arc<Store<K>>,
    allocator: Arc<PortAllocator>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let healthz = warp::get().and(warp::path("healthz")).and_then(healthz::healthz);

    let list_pods = warp::get()
        .and(warp::path!("api" / "v1" / "pods"))
        .and(warp::path::end())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_store(store.clone()))
        .and_then(pods::list_pods);

    let list_pods_ns = warp::get()
        .and(warp::path!("api" / "v1" / "namespaces" / String / "pods"))
        .and(warp::path::end())
        .and(with_store(store.clone()))
        .and_then(pods::list_pods_by_namespace);

    let get_pod = warp::get()
        .and(warp::path!("api" / "v1" / "pods" / String))
        .and(warp::path::end())
        .and(with_store(store.clone()))
        .and_then(pods::get_pod);

    let create_pod = warp::post()
        .and(warp::path!("api" / "v1" / "pods"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_store(store.clone()))
        .and_then(pods::create_pod);

    let replace_pod = warp::put()
        .and(warp::path!("api" / "v1" / "namespaces" / String / "pods" / String))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_store(store.clone()))
        .and_then(pods::replace_pod);

    let update_pod_status = warp::put()
        .and(warp::path!("api" / "v1" / "pods" / String / "status"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_store(store.clone()))
        .and_then(pods::update_pod_status);

    let delete_pod = warp::delete()
        .and(warp::path!("api" / "v1" / "pods" / String))
        .and(warp::path::end())
        .and(with_store(store.clone()))
        .and_then(pods::delete_pod);

    let list_services = warp::get()
        .and(warp::path!("api" / "v1" / "services"))
        .and(warp::path::end())
        .and(with_store(store.clone()))
        .and_then(services::list_services);

    let list_services_ns = warp::get()
        .and(warp::path!("api" / "v1" / "namespaces" / String / "services"))
        .and(warp::path::end())
        .and(with_store(store.clone()))
        .and_then(services::list_services_by_namespace);

    let create_service = warp::post()
        .and(warp::path!("api" / "v1" / "services"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_store(store.clone()))
        .and(with_allocator(allocator.clone()))
        .and_then(services::create_service);

    let delete_service = warp::delete()
        .and(warp::path!(
            "api" / "v1" / "namespaces" / String / "services" / String
        ))
        .and(warp::path::end())
        .and(with_store(store.clone()))
        .and(with_allocator(allocator.clone()))
        .and_then(services::delete_service);

    let list_nodes = warp::get()
        .and(warp::path!("api" / "v1" / "nodes"))
        .and(warp::path::end())
        .and(with_store(store.clone()))
        .and_then(nodes::list_nodes);

    let register_node = warp::post()
        .and(warp::path!("api" / "v1" / "nodes"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_store(store.clone()))
        .and_then(nodes::register_node);

    let update_node_status = warp::put()
        .and(warp::path!("api" / "v1" / "nodes" / String / "status"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_store(store.clone()))
        .and_then(nodes::update_node_status);

    let list_replicasets = warp::get()
        .and(warp::path!("api" / "v1" / "replicasets"))
        .and(warp::path::end())
        .and(with_store(store.clone()))
        .and_then(replicasets::list_replicasets);

    let list_replicasets_ns = warp::get()
        .and(warp::path!(
            "api" / "v1" / "namespaces" / String / "replicasets"
        ))
        .and(warp::path::end())
        .and(with_store(store.clone()))
        .and_then(replicasets::list_replicasets_by_namespace);

    let create_replicaset = warp::post()
        .and(warp::path!("api" / "v1" / "replicasets"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with_store(store.clone()))
        .and_then(replicasets::create_replicaset);

    let delete_replicaset = warp::delete()
        .and(warp::path!(
            "api" / "v1" / "namespaces" / String / "replicasets" / String
        ))
        .and(warp::path::end())
        .and(with_store(store.clone()))
        .and_then(replicasets::delete_replicaset);

    healthz
        .or(list_pods)
        .or(list_pods_ns)
        .or(get_pod)
        .or(create_pod)
        .or(replace_pod)
        .or(update_pod_status)
        .or(delete_pod)
        .or(list_services)
        .or(list_services_ns)
        .or(create_service)
        .or(delete_service)
        .or(list_nodes)
        .or(register_node)
        .or(update_node_status)
        .or(list_replicasets)
        .or(list_replicasets_ns)
        .or(create_replicaset)
        .or(delete_replicaset)
        .recover(crate::error::handle_rejection)
}
