//! A typed HTTP client for the nanokube API server (spec.md §4.2), used by
//! the scheduler, node agent, and proxy so none of them talk raw JSON.
//!
//! Grounded on `original_source/client/client.go`'s method set; ported to
//! `reqwest` rather than hand-rolled `net/http` calls, matching the
//! teacher's `reqwest`-based HTTP usage throughout `kubelet.rs`.

pub mod error;

use nanokube_types::{Node, NodeStatus, Pod, PodStatus, ReplicaSet, Service};

pub use error::ClientError;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            host: "localhost".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    http: reqwest::Client,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Client {
            base_url: format!("http://{}:{}", config.host, config.port),
            http: reqwest::Client::new(),
        }
    }

    /// Builds a client pointed at a specific base URL, used in tests
    /// against a `mockito` server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Client {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    async fn expect_status(
        &self,
        method: &'static str,
        path: String,
        response: reqwest::Response,
        expected: reqwest::StatusCode,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status != expected {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::UnexpectedStatus {
                method,
                path,
                status,
                body,
            });
        }
        Ok(response)
    }

    pub async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, ClientError> {
        let path = if namespace.is_empty() {
            "/api/v1/pods".to_string()
        } else {
            format!("/api/v1/namespaces/{}/pods", namespace)
        };
        let resp = self.http.get(format!("{}{}", self.base_url, path)).send().await?;
        let resp = self.expect_status("GET", path, resp, reqwest::StatusCode::OK).await?;
        Ok(resp.json().await?)
    }

    /// `fieldSelector=spec.nodeName=<node_name>`, per spec.md §4.2's list
    /// endpoint's documented field selector.
    pub async fn list_pods_on_node(&self, node_name: &str) -> Result<Vec<Pod>, ClientError> {
        let path = "/api/v1/pods".to_string();
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(&[("fieldSelector", format!("spec.nodeName={}", node_name))])
            .send()
            .await?;
        let resp = self.expect_status("GET", path, resp, reqwest::StatusCode::OK).await?;
        Ok(resp.json().await?)
    }

    pub async fn get_pod(&self, name: &str) -> Result<Option<Pod>, ClientError> {
        let path = format!("/api/v1/pods/{}", name);
        let resp = self.http.get(format!("{}{}", self.base_url, path)).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = self.expect_status("GET", path, resp, reqwest::StatusCode::OK).await?;
        Ok(Some(resp.json().await?))
    }

    pub async fn create_pod(&self, pod: &Pod) -> Result<Pod, ClientError> {
        let path = "/api/v1/pods".to_string();
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(pod)
            .send()
            .await?;
        let resp = self
            .expect_status("POST", path, resp, reqwest::StatusCode::CREATED)
            .await?;
        Ok(resp.json().await?)
    }

    pub async fn replace_pod(&self, namespace: &str, name: &str, pod: &Pod) -> Result<(), ClientError> {
        let path = format!("/api/v1/namespaces/{}/pods/{}", namespace, name);
        let resp = self
            .http
            .put(format!("{}{}", self.base_url, path))
            .json(pod)
            .send()
            .await?;
        self.expect_status("PUT", path, resp, reqwest::StatusCode::OK).await?;
        Ok(())
    }

    /// Status-only update: the stored spec is preserved, per spec.md §4.2.
    pub async fn update_pod_status(&self, name: &str, status: &PodStatus) -> Result<(), ClientError> {
        let path = format!("/api/v1/pods/{}/status", name);
        let resp = self
            .http
            .put(format!("{}{}", self.base_url, path))
            .json(status)
            .send()
            .await?;
        self.expect_status("PUT", path, resp, reqwest::StatusCode::OK).await?;
        Ok(())
    }

    pub async fn delete_pod(&self, name: &str) -> Result<(), ClientError> {
        let path = format!("/api/v1/pods/{}", name);
        let resp = self.http.delete(format!("{}{}", self.base_url, path)).send().await?;
        self.expect_status("DELETE", path, resp, reqwest::StatusCode::OK).await?;
        Ok(())
    }

    pub async fn list_services(&self, namespace: &str) -> Result<Vec<Service>, ClientError> {
        let path = if namespace.is_empty() {
            "/api/v1/services".to_string()
        } else {
            format!("/api/v1/namespaces/{}/services", namespace)
        };
        let resp = self.http.get(format!("{}{}", self.base_url, path)).send().await?;
        let resp = self.expect_status("GET", path, resp, reqwest::StatusCode::OK).await?;
        Ok(resp.json().await?)
    }

    pub async fn create_service(&self, service: &Service) -> Result<Service, ClientError> {
        let path = "/api/v1/services".to_string();
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(service)
            .send()
            .await?;
        let resp = self
            .expect_status("POST", path, resp, reqwest::StatusCode::CREATED)
            .await?;
        Ok(resp.json().await?)
    }

    pub async fn list_nodes(&self) -> Result<Vec<Node>, ClientError> {
        let path = "/api/v1/nodes".to_string();
        let resp = self.http.get(format!("{}{}", self.base_url, path)).send().await?;
        let resp = self.expect_status("GET", path, resp, reqwest::StatusCode::OK).await?;
        Ok(resp.json().await?)
    }

    pub async fn register_node(&self, node: &Node) -> Result<Node, ClientError> {
        let path = "/api/v1/nodes".to_string();
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(node)
            .send()
            .await?;
        let resp = self
            .expect_status("POST", path, resp, reqwest::StatusCode::CREATED)
            .await?;
        Ok(resp.json().await?)
    }

    pub async fn update_node_status(&self, name: &str, status: &NodeStatus) -> Result<(), ClientError> {
        let path = format!("/api/v1/nodes/{}/status", name);
        let resp = self
            .http
            .put(format!("{}{}", self.base_url, path))
            .json(status)
            .send()
            .await?;
        self.expect_status("PUT", path, resp, reqwest::StatusCode::OK).await?;
        Ok(())
    }

    pub async fn list_replicasets(&self, namespace: &str) -> Result<Vec<ReplicaSet>, ClientError> {
        let path = if namespace.is_empty() {
            "/api/v1/replicasets".to_string()
        } else {
            format!("/api/v1/namespaces/{}/replicasets", namespace)
        };
        let resp = self.http.get(format!("{}{}", self.base_url, path)).send().await?;
        let resp = self.expect_status("GET", path, resp, reqwest::StatusCode::OK).await?;
        Ok(resp.json().await?)
    }

    /// `POST /api/v1/replicasets` doubles as an upsert: the API server
    /// stores ReplicaSets at a name-derived key with no uniqueness check, so
    /// posting one with a name already in the store just overwrites it —
    /// this is how the reconciler persists an updated `status.replicas`.
    pub async fn upsert_replicaset(&self, rs: &ReplicaSet) -> Result<ReplicaSet, ClientError> {
        let path = "/api/v1/replicasets".to_string();
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(rs)
            .send()
            .await?;
        let resp = self
            .expect_status("POST", path, resp, reqwest::StatusCode::CREATED)
            .await?;
        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nanokube_types::pod::Metadata;

    fn sample_pod() -> Pod {
        Pod {
            metadata: Metadata::new("default", "nginx"),
            spec: nanokube_types::PodSpec {
                containers: vec![],
                node_name: String::new(),
            },
            status: PodStatus::default(),
        }
    }

    #[tokio::test]
    async fn list_pods_hits_cluster_wide_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/pods")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;
        let client = Client::with_base_url(server.url());
        let pods = client.list_pods("").await.unwrap();
        assert!(pods.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn list_pods_scopes_to_namespace_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/namespaces/kube-system/pods")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;
        let client = Client::with_base_url(server.url());
        client.list_pods("kube-system").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_pod_returns_none_on_404() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/api/v1/pods/ghost").with_status(404).create_async().await;
        let client = Client::with_base_url(server.url());
        assert_eq!(client.get_pod("ghost").await.unwrap(), None);
    }

    #[tokio::test]
    async fn create_pod_requires_201() {
        let mut server = mockito::Server::new_async().await;
        let pod = sample_pod();
        let body = serde_json::to_string(&pod).unwrap();
        let mock = server
            .mock("POST", "/api/v1/pods")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        let client = Client::with_base_url(server.url());
        let created = client.create_pod(&pod).await.unwrap();
        assert_eq!(created.metadata.name, "nginx");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_pod_surfaces_unexpected_status() {
        let mut server = mockito::Server::new_async().await;
        let pod = sample_pod();
        let _mock = server
            .mock("POST", "/api/v1/pods")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;
        let client = Client::with_base_url(server.url());
        let err = client.create_pod(&pod).await.unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedStatus { .. }));
    }

    #[tokio::test]
    async fn delete_pod_uses_name_only_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("DELETE", "/api/v1/pods/nginx").with_status(200).create_async().await;
        let client = Client::with_base_url(server.url());
        client.delete_pod("nginx").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn upsert_replicaset_posts_to_collection_path() {
        let mut server = mockito::Server::new_async().await;
        let rs = ReplicaSet {
            metadata: Metadata::new("default", "web"),
            spec: nanokube_types::ReplicaSetSpec::default(),
            status: nanokube_types::ReplicaSetStatus::default(),
        };
        let body = serde_json::to_string(&rs).unwrap();
        let mock = server
            .mock("POST", "/api/v1/replicasets")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        let client = Client::with_base_url(server.url());
        let upserted = client.upsert_replicaset(&rs).await.unwrap();
        assert_eq!(upserted.metadata.name, "web");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn list_replicasets_scopes_to_namespace_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/namespaces/default/replicasets")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;
        let client = Client::with_base_url(server.url());
        client.list_replicasets("default").await.unwrap();
        mock.assert_async().await;
    }
}
