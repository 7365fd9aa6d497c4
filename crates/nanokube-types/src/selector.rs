//! Label selector matching.
//!
//! `original_source/agent/node_agent.go` and
//! `original_source/proxy/service_updater.go` each carry their own copy of
//! `matchLabels`; this unifies the two into a single tested helper used by
//! both the node agent (service-to-pod matching) and the proxy (backend
//! discovery).

use std::collections::BTreeMap;

/// A map of label keys to required values. A Pod matches a selector iff
/// every key in the selector is present in the Pod's labels with an equal
/// value. Per spec.md §4.4: "An empty selector matches nothing."
pub struct Selector<'a>(&'a BTreeMap<String, String>);

impl<'a> Selector<'a> {
    pub fn new(selector: &'a BTreeMap<String, String>) -> Self {
        Selector(selector)
    }

    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        if self.0.is_empty() {
            return false;
        }
        self.0.iter().all(|(k, v)| labels.get(k) == Some(v))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_selector_matches_nothing() {
        let selector = map(&[]);
        let labels = map(&[("app", "web")]);
        assert!(!Selector::new(&selector).matches(&labels));
    }

    #[test]
    fn exact_match_on_single_label() {
        let selector = map(&[("app", "web")]);
        let labels = map(&[("app", "web"), ("tier", "frontend")]);
        assert!(Selector::new(&selector).matches(&labels));
    }

    #[test]
    fn missing_label_does_not_match() {
        let selector = map(&[("app", "web"), ("tier", "frontend")]);
        let labels = map(&[("app", "web")]);
        assert!(!Selector::new(&selector).matches(&labels));
    }

    #[test]
    fn mismatched_value_does_not_match() {
        let selector = map(&[("app", "web")]);
        let labels = map(&[("app", "api")]);
        assert!(!Selector::new(&selector).matches(&labels));
    }
}
