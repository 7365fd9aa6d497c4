//! Typed, key-schema-aware access over a raw [`Kv`], per spec.md §4.1.
//!
//! Keys: `pods:<namespace>:<name>`, `nodes:<name>`, `services:<namespace>:<name>`,
//! `replicasets:<namespace>:<name>`. Saving or deleting a pod also publishes
//! to [`crate::POD_EVENTS_CHANNEL`].

use nanokube_types::{normalize_namespace, Node, Pod, ReplicaSet, Service};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::StoreError;
use crate::kv::Kv;
use crate::{pod_event_message, PodEventType, POD_EVENTS_CHANNEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Pod,
    Node,
    Service,
    ReplicaSet,
}

impl Kind {
    fn prefix(self) -> &'static str {
        match self {
            Kind::Pod => "pods",
            Kind::Node => "nodes",
            Kind::Service => "services",
            Kind::ReplicaSet => "replicasets",
        }
    }

    /// Nodes are not namespaced: their key is `nodes:<name>`, everything
    /// else is `<prefix>:<namespace>:<name>`.
    fn namespaced(self) -> bool {
        !matches!(self, Kind::Node)
    }
}

impl std::str::FromStr for Kind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pods" => Ok(Kind::Pod),
            "nodes" => Ok(Kind::Node),
            "services" => Ok(Kind::Service),
            "replicasets" => Ok(Kind::ReplicaSet),
            other => Err(StoreError::UnknownKind(other.to_string())),
        }
    }
}

fn key_for(kind: Kind, namespace: &str, name: &str) -> String {
    if kind.namespaced() {
        format!("{}:{}:{}", kind.prefix(), normalize_namespace(namespace), name)
    } else {
        format!("{}:{}", kind.prefix(), name)
    }
}

/// `namespace == ""` means "all namespaces": the list scan uses a bare
/// `<prefix>:*` pattern instead of `<prefix>:<namespace>:*`.
fn list_pattern(kind: Kind, namespace: &str) -> String {
    if !kind.namespaced() || namespace.is_empty() {
        format!("{}:*", kind.prefix())
    } else {
        format!("{}:{}:*", kind.prefix(), normalize_namespace(namespace))
    }
}

pub struct Store<K: Kv> {
    kv: std::sync::Arc<K>,
}

impl<K: Kv> Clone for Store<K> {
    fn clone(&self) -> Self {
        Store { kv: self.kv.clone() }
    }
}

impl<K: Kv> Store<K> {
    pub fn new(kv: K) -> Self {
        Store {
            kv: std::sync::Arc::new(kv),
        }
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Shares the underlying `Kv` with another collaborator that needs its
    /// own handle — e.g. a `PortAllocator`, which stores its bitset under a
    /// well-known key in the same backend.
    pub fn kv_arc(&self) -> std::sync::Arc<K> {
        self.kv.clone()
    }

    async fn save<T: Serialize>(&self, kind: Kind, namespace: &str, name: &str, value: &T) -> Result<(), StoreError> {
        let key = key_for(kind, namespace, name);
        let encoded = serde_json::to_string(value)?;
        self.kv.set(&key, &encoded, None).await
    }

    async fn get<T: DeserializeOwned>(&self, kind: Kind, namespace: &str, name: &str) -> Result<Option<T>, StoreError> {
        let key = key_for(kind, namespace, name);
        match self.kv.get(&key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn list<T: DeserializeOwned>(&self, kind: Kind, namespace: &str) -> Result<Vec<T>, StoreError> {
        let pattern = list_pattern(kind, namespace);
        let keys = self.kv.keys(&pattern).await?;
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(raw) = self.kv.get(&key).await? {
                out.push(serde_json::from_str(&raw)?);
            }
        }
        Ok(out)
    }

    async fn delete(&self, kind: Kind, namespace: &str, name: &str) -> Result<(), StoreError> {
        let key = key_for(kind, namespace, name);
        self.kv.del(&key).await
    }

    pub async fn save_pod(&self, pod: &Pod) -> Result<(), StoreError> {
        let is_update = self
            .get_pod(&pod.metadata.namespace, &pod.metadata.name)
            .await?
            .is_some();
        self.save(Kind::Pod, &pod.metadata.namespace, &pod.metadata.name, pod)
            .await?;
        let event = if is_update {
            PodEventType::Update
        } else {
            PodEventType::Create
        };
        self.kv
            .publish(
                POD_EVENTS_CHANNEL,
                &pod_event_message(event, &pod.metadata.namespace, &pod.metadata.name),
            )
            .await
    }

    pub async fn get_pod(&self, namespace: &str, name: &str) -> Result<Option<Pod>, StoreError> {
        self.get(Kind::Pod, namespace, name).await
    }

    pub async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, StoreError> {
        self.list(Kind::Pod, namespace).await
    }

    pub async fn delete_pod(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        self.delete(Kind::Pod, namespace, name).await?;
        self.kv
            .publish(POD_EVENTS_CHANNEL, &pod_event_message(PodEventType::Delete, namespace, name))
            .await
    }

    pub async fn save_node(&self, node: &Node) -> Result<(), StoreError> {
        self.save(Kind::Node, "", &node.name, node).await
    }

    pub async fn get_node(&self, name: &str) -> Result<Option<Node>, StoreError> {
        self.get(Kind::Node, "", name).await
    }

    pub async fn list_nodes(&self) -> Result<Vec<Node>, StoreError> {
        self.list(Kind::Node, "").await
    }

    pub async fn delete_node(&self, name: &str) -> Result<(), StoreError> {
        self.delete(Kind::Node, "", name).await
    }

    pub async fn save_service(&self, service: &Service) -> Result<(), StoreError> {
        self.save(Kind::Service, &service.metadata.namespace, &service.metadata.name, service)
            .await
    }

    pub async fn get_service(&self, namespace: &str, name: &str) -> Result<Option<Service>, StoreError> {
        self.get(Kind::Service, namespace, name).await
    }

    pub async fn list_services(&self, namespace: &str) -> Result<Vec<Service>, StoreError> {
        self.list(Kind::Service, namespace).await
    }

    pub async fn delete_service(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        self.delete(Kind::Service, namespace, name).await
    }

    pub async fn save_replicaset(&self, rs: &ReplicaSet) -> Result<(), StoreError> {
        self.save(Kind::ReplicaSet, &rs.metadata.namespace, &rs.metadata.name, rs)
            .await
    }

    pub async fn get_replicaset(&self, namespace: &str, name: &str) -> Result<Option<ReplicaSet>, StoreError> {
        self.get(Kind::ReplicaSet, namespace, name).await
    }

    pub async fn list_replicasets(&self, namespace: &str) -> Result<Vec<ReplicaSet>, StoreError> {
        self.list(Kind::ReplicaSet, namespace).await
    }

    pub async fn delete_replicaset(&self, namespace: &str, name: &str) -> Result<(), StoreError> {
        self.delete(Kind::ReplicaSet, namespace, name).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::memory::InMemoryKv;
    use nanokube_types::pod::{Metadata, PodSpec};

    fn new_store() -> Store<InMemoryKv> {
        Store::new(InMemoryKv::new())
    }

    fn sample_pod(namespace: &str, name: &str) -> Pod {
        Pod {
            metadata: Metadata::new(namespace, name),
            spec: PodSpec {
                containers: vec![],
                node_name: String::new(),
            },
            status: Default::default(),
        }
    }

    #[tokio::test]
    async fn save_and_get_pod_round_trips() {
        let store = new_store();
        let pod = sample_pod("default", "nginx");
        store.save_pod(&pod).await.unwrap();
        let fetched = store.get_pod("default", "nginx").await.unwrap().unwrap();
        assert_eq!(fetched.metadata.name, "nginx");
    }

    #[tokio::test]
    async fn empty_namespace_lists_across_all_namespaces() {
        let store = new_store();
        store.save_pod(&sample_pod("default", "a")).await.unwrap();
        store.save_pod(&sample_pod("kube-system", "b")).await.unwrap();
        let all = store.list_pods("").await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn namespace_scan_is_scoped() {
        let store = new_store();
        store.save_pod(&sample_pod("default", "a")).await.unwrap();
        store.save_pod(&sample_pod("kube-system", "b")).await.unwrap();
        let scoped = store.list_pods("default").await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].metadata.name, "a");
    }

    #[tokio::test]
    async fn missing_pod_is_not_an_error() {
        let store = new_store();
        assert!(store.get_pod("default", "ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_pod_publishes_create_then_update_events() {
        let store = new_store();
        let mut rx = store.kv().subscribe(POD_EVENTS_CHANNEL);
        let pod = sample_pod("default", "nginx");
        store.save_pod(&pod).await.unwrap();
        store.save_pod(&pod).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), "create:default/nginx");
        assert_eq!(rx.recv().await.unwrap(), "update:default/nginx");
    }

    #[tokio::test]
    async fn delete_pod_publishes_delete_event() {
        let store = new_store();
        let mut rx = store.kv().subscribe(POD_EVENTS_CHANNEL);
        store.save_pod(&sample_pod("default", "nginx")).await.unwrap();
        rx.recv().await.unwrap();
        store.delete_pod("default", "nginx").await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), "delete:default/nginx");
        assert!(store.get_pod("default", "nginx").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn nodes_are_not_namespaced() {
        let store = new_store();
        let node = Node::new("n1", "10.0.0.1");
        store.save_node(&node).await.unwrap();
        assert!(store.get_node("n1").await.unwrap().is_some());
        assert_eq!(store.list_nodes().await.unwrap().len(), 1);
    }

    #[test]
    fn kind_round_trips_through_prefix_strings() {
        use std::str::FromStr;
        assert_eq!(Kind::from_str("pods").unwrap(), Kind::Pod);
        assert!(Kind::from_str("bogus").is_err());
    }
}
