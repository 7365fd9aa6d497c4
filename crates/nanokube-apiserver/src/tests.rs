use std::sync::Arc;

use nanokube_store::{InMemoryKv, PortAllocator, Store};
use nanokube_types::pod::{Metadata as PodMetadata, PodSpec};
use nanokube_types::{Container, ContainerResources, Pod, Service, ServicePort, ServiceSpec, ServiceType};

use crate::routes::build_routes;

fn harness() -> (Store<InMemoryKv>, Arc<PortAllocator>) {
    let kv = InMemoryKv::new();
    let store = Store::new(kv);
    let allocator = Arc::new(PortAllocator::new(store.kv_arc()));
    (store, allocator)
}

fn sample_pod(name: &str) -> Pod {
    Pod {
        metadata: PodMetadata::new("default", name),
        spec: PodSpec {
            containers: vec![Container {
                name: name.to_string(),
                image: "nginx:alpine".to_string(),
                command: None,
                resources: ContainerResources::default(),
            }],
            node_name: String::new(),
        },
        status: Default::default(),
    }
}

#[tokio::test]
async fn create_pod_assigns_uid_and_pending_phase() {
    let (store, allocator) = harness();
    let routes = build_routes(Arc::new(store), allocator);

    let res = warp::test::request()
        .method("POST")
        .path("/api/v1/pods")
        .json(&sample_pod("nginx"))
        .reply(&routes)
        .await;

    assert_eq!(res.status(), 201);
    let body: Pod = serde_json::from_slice(res.body()).unwrap();
    assert!(!body.metadata.uid.is_empty());
    assert_eq!(body.status.phase, nanokube_types::PodPhase::Pending);
    assert!(body.metadata.name.ends_with("-nginx"));
}

#[tokio::test]
async fn create_pod_without_containers_is_rejected() {
    let (store, allocator) = harness();
    let routes = build_routes(Arc::new(store), allocator);

    let mut pod = sample_pod("empty");
    pod.spec.containers.clear();

    let res = warp::test::request()
        .method("POST")
        .path("/api/v1/pods")
        .json(&pod)
        .reply(&routes)
        .await;

    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn get_missing_pod_is_404() {
    let (store, allocator) = harness();
    let routes = build_routes(Arc::new(store), allocator);

    let res = warp::test::request()
        .method("GET")
        .path("/api/v1/pods/ghost")
        .reply(&routes)
        .await;

    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn delete_missing_pod_is_idempotent_success() {
    let (store, allocator) = harness();
    let routes = build_routes(Arc::new(store), allocator);

    let res = warp::test::request()
        .method("DELETE")
        .path("/api/v1/pods/ghost")
        .reply(&routes)
        .await;

    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn field_selector_filters_pods_by_node_name() {
    let (store, allocator) = harness();
    store.save_pod(&{
        let mut p = sample_pod("on-n1");
        p.spec.node_name = "n1".to_string();
        p
    }).await.unwrap();
    store.save_pod(&{
        let mut p = sample_pod("on-n2");
        p.spec.node_name = "n2".to_string();
        p
    }).await.unwrap();
    let routes = build_routes(Arc::new(store), allocator);

    let res = warp::test::request()
        .method("GET")
        .path("/api/v1/pods?fieldSelector=spec.nodeName=n1")
        .reply(&routes)
        .await;

    assert_eq!(res.status(), 200);
    let pods: Vec<Pod> = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(pods.len(), 1);
    assert_eq!(pods[0].spec.node_name, "n1");
}

fn node_port_service(name: &str, node_port: Option<u16>) -> Service {
    Service {
        metadata: PodMetadata::new("default", name),
        spec: ServiceSpec {
            service_type: ServiceType::NodePort,
            selector: Default::default(),
            ports: vec![ServicePort {
                port: 80,
                target_port: 80,
                node_port,
            }],
        },
    }
}

#[tokio::test]
async fn create_service_allocates_node_port_when_absent() {
    let (store, allocator) = harness();
    let routes = build_routes(Arc::new(store), allocator);

    let res = warp::test::request()
        .method("POST")
        .path("/api/v1/services")
        .json(&node_port_service("web", None))
        .reply(&routes)
        .await;

    assert_eq!(res.status(), 201);
    let service: Service = serde_json::from_slice(res.body()).unwrap();
    let allocated = service.spec.ports[0].node_port.unwrap();
    assert!(nanokube_types::service::NODE_PORT_RANGE.contains(&allocated));
}

#[tokio::test]
async fn colliding_node_port_is_conflict() {
    let (store, allocator) = harness();
    let routes = build_routes(Arc::new(store), allocator);

    let first = warp::test::request()
        .method("POST")
        .path("/api/v1/services")
        .json(&node_port_service("a", Some(30080)))
        .reply(&routes)
        .await;
    assert_eq!(first.status(), 201);

    let second = warp::test::request()
        .method("POST")
        .path("/api/v1/services")
        .json(&node_port_service("b", Some(30080)))
        .reply(&routes)
        .await;
    assert_eq!(second.status(), 409);
}

#[tokio::test]
async fn register_node_then_list_returns_it() {
    let (store, allocator) = harness();
    let routes = build_routes(Arc::new(store), allocator);

    let node = nanokube_types::Node::new("n1", "10.0.0.1");
    let res = warp::test::request()
        .method("POST")
        .path("/api/v1/nodes")
        .json(&node)
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 201);

    let list = warp::test::request()
        .method("GET")
        .path("/api/v1/nodes")
        .reply(&routes)
        .await;
    let nodes: Vec<nanokube_types::Node> = serde_json::from_slice(list.body()).unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].status.phase, nanokube_types::NodePhase::Ready);
}

#[tokio::test]
async fn update_pod_status_preserves_spec() {
    let (store, allocator) = harness();
    store.save_pod(&sample_pod("nginx")).await.unwrap();
    let routes = build_routes(Arc::new(store), allocator);

    let status = nanokube_types::PodStatus {
        phase: nanokube_types::PodPhase::Running,
        host_ip: "10.0.0.1".to_string(),
        ..Default::default()
    };
    let res = warp::test::request()
        .method("PUT")
        .path("/api/v1/pods/nginx/status")
        .json(&status)
        .reply(&routes)
        .await;

    assert_eq!(res.status(), 200);
    let body: Pod = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(body.status.phase, nanokube_types::PodPhase::Running);
    assert_eq!(body.status.host_ip, "10.0.0.1");
    assert_eq!(body.spec.containers.len(), 1);
}

#[tokio::test]
async fn update_status_of_missing_pod_is_404() {
    let (store, allocator) = harness();
    let routes = build_routes(Arc::new(store), allocator);

    let res = warp::test::request()
        .method("PUT")
        .path("/api/v1/pods/ghost/status")
        .json(&nanokube_types::PodStatus::default())
        .reply(&routes)
        .await;

    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn healthz_reports_ok() {
    let (store, allocator) = harness();
    let routes = build_routes(Arc::new(store), allocator);

    let res = warp::test::request().method("GET").path("/healthz").reply(&routes).await;
    assert_eq!(res.status(), 200);
}
