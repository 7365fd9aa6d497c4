//! Supplemental ReplicaSet reconciler (SPEC_FULL.md §3 ADDED): fills the
//! shortfall between `spec.replicas` and the count of live matching Pods.
//! spec.md calls ReplicaSet reconciliation "a separate reconciler not
//! specified in detail here" — this keeps it a second, lower-frequency loop
//! alongside the Pod placement loop rather than a new crate.

use nanokube_types::selector::Selector;
use nanokube_types::{Pod, PodPhase, ReplicaSet};

/// How many new Pods a reconcile pass should create, plus status counters
/// to persist back onto the ReplicaSet.
pub struct Reconciliation {
    pub to_create: u32,
    pub replicas: u32,
    pub ready_replicas: u32,
}

/// `live` Pods are ones not in a terminal phase; `Failed`/`Succeeded` Pods
/// don't count against the desired replica count, mirroring how a
/// ReplicaSet controller never "fixes" a Pod it already let finish.
pub fn reconcile(rs: &ReplicaSet, matching_pods: &[Pod]) -> Reconciliation {
    let live: Vec<&Pod> = matching_pods
        .iter()
        .filter(|p| !matches!(p.status.phase, PodPhase::Failed | PodPhase::Succeeded))
        .collect();
    let ready_replicas = live.iter().filter(|p| p.status.phase == PodPhase::Running).count() as u32;
    let replicas = live.len() as u32;
    let to_create = rs.spec.replicas.saturating_sub(replicas);
    Reconciliation {
        to_create,
        replicas,
        ready_replicas,
    }
}

/// Pods in `namespace` whose labels satisfy `rs`'s selector.
pub fn matching_pods<'a>(rs: &ReplicaSet, pods: &'a [Pod]) -> Vec<&'a Pod> {
    let selector = Selector::new(&rs.spec.selector.match_labels);
    pods.iter()
        .filter(|p| p.metadata.namespace == rs.metadata.namespace && selector.matches(&p.metadata.labels))
        .collect()
}

/// Builds a new Pod from the ReplicaSet's template, ready to POST.
pub fn pod_from_template(rs: &ReplicaSet) -> Pod {
    let mut metadata = nanokube_types::Metadata::new(rs.metadata.namespace.clone(), rs.metadata.name.clone());
    metadata.labels = rs.spec.template.metadata.labels.clone();
    Pod {
        metadata,
        spec: rs.spec.template.spec.clone(),
        status: Default::default(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nanokube_types::{LabelSelector, Metadata, PodSpec, PodStatus, PodTemplate, PodTemplateSpec, ReplicaSetSpec};
    use std::collections::BTreeMap;

    fn labeled_pod(namespace: &str, phase: PodPhase, labels: &[(&str, &str)]) -> Pod {
        let mut metadata = Metadata::new(namespace, "p");
        metadata.labels = labels.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Pod {
            metadata,
            spec: PodSpec::default(),
            status: PodStatus {
                phase,
                ..Default::default()
            },
        }
    }

    fn sample_rs(replicas: u32) -> ReplicaSet {
        let mut match_labels = BTreeMap::new();
        match_labels.insert("app".to_string(), "web".to_string());
        ReplicaSet {
            metadata: Metadata::new("default", "web"),
            spec: ReplicaSetSpec {
                replicas,
                selector: LabelSelector { match_labels: match_labels.clone() },
                template: PodTemplate {
                    metadata: PodTemplateSpec { labels: match_labels },
                    spec: PodSpec::default(),
                },
            },
            status: Default::default(),
        }
    }

    #[test]
    fn shortfall_requests_missing_replicas() {
        let rs = sample_rs(3);
        let pods = vec![labeled_pod("default", PodPhase::Running, &[("app", "web")])];
        let recon = reconcile(&rs, &pods);
        assert_eq!(recon.to_create, 2);
        assert_eq!(recon.replicas, 1);
        assert_eq!(recon.ready_replicas, 1);
    }

    #[test]
    fn terminal_pods_do_not_count_toward_replicas() {
        let rs = sample_rs(2);
        let pods = vec![
            labeled_pod("default", PodPhase::Running, &[("app", "web")]),
            labeled_pod("default", PodPhase::Failed, &[("app", "web")]),
        ];
        let recon = reconcile(&rs, &pods);
        assert_eq!(recon.replicas, 1);
        assert_eq!(recon.to_create, 1);
    }

    #[test]
    fn no_shortfall_when_fully_replicated() {
        let rs = sample_rs(2);
        let pods = vec![
            labeled_pod("default", PodPhase::Running, &[("app", "web")]),
            labeled_pod("default", PodPhase::Pending, &[("app", "web")]),
        ];
        let recon = reconcile(&rs, &pods);
        assert_eq!(recon.to_create, 0);
        assert_eq!(recon.ready_replicas, 1);
    }

    #[test]
    fn matching_pods_filters_by_namespace_and_selector() {
        let rs = sample_rs(1);
        let pods = vec![
            labeled_pod("default", PodPhase::Running, &[("app", "web")]),
            labeled_pod("other", PodPhase::Running, &[("app", "web")]),
            labeled_pod("default", PodPhase::Running, &[("app", "api")]),
        ];
        let matched = matching_pods(&rs, &pods);
        assert_eq!(matched.len(), 1);
    }

    #[test]
    fn pod_from_template_carries_template_labels() {
        let rs = sample_rs(1);
        let pod = pod_from_template(&rs);
        assert_eq!(pod.metadata.labels.get("app"), Some(&"web".to_string()));
        assert_eq!(pod.metadata.namespace, "default");
    }
}
