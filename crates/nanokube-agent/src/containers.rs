//! Container spec construction: quantity translation and NodePort service
//! matching, per spec.md §4.4's container start contract.

use nanokube_runtime::{ContainerSpec, PortMapping};
use nanokube_types::quantity;
use nanokube_types::selector::Selector;
use nanokube_types::{Container, Pod, Service};

/// Defaults `original_source/agent/node_agent.go`'s `startPod` falls back
/// to when a container sets no explicit resource limit.
const DEFAULT_MEMORY_LIMIT: &str = "512m";
const DEFAULT_CPU_LIMIT: &str = "1.000";

/// NodePort Services whose selector matches this Pod's labels. An empty
/// selector matches nothing, per `Selector`'s own contract.
pub fn matching_node_port_services<'a>(pod: &Pod, services: &'a [Service]) -> Vec<&'a Service> {
    services
        .iter()
        .filter(|s| s.is_node_port() && Selector::new(&s.spec.selector).matches(&pod.metadata.labels))
        .collect()
}

/// A Pod carries a single `assignedPort`, so only one port mapping is ever
/// built: the first port of the first matching Service. Multiple matching
/// Services with different `targetPort`s can't all be satisfied by one
/// host-side port; this picks the first and leaves the rest unmapped,
/// which is enough for the common one-Service-per-Pod case this system
/// targets.
pub fn port_mapping_for(assigned_port: u16, matches: &[&Service]) -> Option<PortMapping> {
    matches.iter().find_map(|s| s.spec.ports.first()).map(|port| PortMapping {
        host_port: assigned_port,
        container_port: port.target_port,
    })
}

pub fn build_container_spec(pod: &Pod, container: &Container, port_mappings: Vec<PortMapping>) -> ContainerSpec {
    let memory_limit = container
        .resources
        .limits
        .get("memory")
        .and_then(|raw| quantity::memory_to_runtime_string(raw).ok())
        .unwrap_or_else(|| DEFAULT_MEMORY_LIMIT.to_string());
    let cpu_limit = container
        .resources
        .limits
        .get("cpu")
        .and_then(|raw| quantity::cpu_to_runtime_string(raw).ok())
        .unwrap_or_else(|| DEFAULT_CPU_LIMIT.to_string());
    ContainerSpec {
        name: pod.metadata.name.clone(),
        image: container.image.clone(),
        command: container.command.clone(),
        memory_limit,
        cpu_limit,
        port_mappings,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nanokube_types::pod::Metadata as PodMetadata;
    use nanokube_types::{ContainerResources, PodSpec, ServicePort, ServiceSpec, ServiceType};
    use std::collections::BTreeMap;

    fn labeled_pod(labels: &[(&str, &str)]) -> Pod {
        let mut pod = Pod {
            metadata: PodMetadata::new("default", "web"),
            spec: PodSpec::default(),
            status: Default::default(),
        };
        pod.metadata.labels = labels.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        pod
    }

    fn node_port_service(name: &str, selector: &[(&str, &str)], target_port: u16) -> Service {
        Service {
            metadata: PodMetadata::new("default", name),
            spec: ServiceSpec {
                service_type: ServiceType::NodePort,
                selector: selector.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
                ports: vec![ServicePort {
                    port: 80,
                    target_port,
                    node_port: Some(30080),
                }],
            },
        }
    }

    #[test]
    fn matches_only_services_whose_selector_is_satisfied() {
        let pod = labeled_pod(&[("app", "web")]);
        let matching = node_port_service("web", &[("app", "web")], 8080);
        let other = node_port_service("other", &[("app", "api")], 9090);
        let services = vec![matching.clone(), other];

        let matched = matching_node_port_services(&pod, &services);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].metadata.name, "web");
    }

    #[test]
    fn empty_selector_never_matches() {
        let pod = labeled_pod(&[("app", "web")]);
        let services = vec![node_port_service("web", &[], 8080)];
        assert!(matching_node_port_services(&pod, &services).is_empty());
    }

    #[test]
    fn port_mapping_uses_first_matching_services_target_port() {
        let svc = node_port_service("web", &[("app", "web")], 8080);
        let matches = vec![&svc];
        let mapping = port_mapping_for(40001, &matches).unwrap();
        assert_eq!(mapping.host_port, 40001);
        assert_eq!(mapping.container_port, 8080);
    }

    #[test]
    fn no_matching_services_yields_no_mapping() {
        assert_eq!(port_mapping_for(40001, &[]), None);
    }

    #[test]
    fn build_spec_translates_quantities() {
        let pod = labeled_pod(&[]);
        let mut limits = BTreeMap::new();
        limits.insert("memory".to_string(), "128Mi".to_string());
        limits.insert("cpu".to_string(), "500m".to_string());
        let container = Container {
            name: "web".to_string(),
            image: "nginx:alpine".to_string(),
            command: None,
            resources: ContainerResources {
                requests: BTreeMap::new(),
                limits,
            },
        };

        let spec = build_container_spec(&pod, &container, vec![]);
        assert_eq!(spec.memory_limit, "128m");
        assert_eq!(spec.cpu_limit, "0.500");
    }

    #[test]
    fn build_spec_falls_back_to_defaults_when_unset() {
        let pod = labeled_pod(&[]);
        let container = Container {
            name: "web".to_string(),
            image: "nginx:alpine".to_string(),
            command: None,
            resources: ContainerResources::default(),
        };

        let spec = build_container_spec(&pod, &container, vec![]);
        assert_eq!(spec.memory_limit, DEFAULT_MEMORY_LIMIT);
        assert_eq!(spec.cpu_limit, DEFAULT_CPU_LIMIT);
    }
}
