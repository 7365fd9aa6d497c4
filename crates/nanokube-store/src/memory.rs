//! An in-process `Kv` implementation.
//!
//! The real KV server (spec.md assumes something Redis-shaped) is an
//! external collaborator out of this system's scope; this is the stand-in
//! used by every control loop's tests and by the default single-process
//! wiring, backed by a `tokio::sync::RwLock<BTreeMap<..>>` plus one
//! `tokio::sync::broadcast` channel per subscribed-to topic.

use std::collections::BTreeMap;
use std::sync::Mutex as StdMutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use crate::error::StoreError;
use crate::kv::{matches_pattern, Kv};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

#[derive(Default)]
pub struct InMemoryKv {
    entries: RwLock<BTreeMap<String, Entry>>,
    channels: StdMutex<BTreeMap<String, broadcast::Sender<String>>>,
}

impl InMemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    fn channel(&self, channel: &str) -> broadcast::Sender<String> {
        let mut channels = self.channels.lock().expect("channel map poisoned");
        channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(256).0)
            .clone()
    }
}

#[async_trait]
impl Kv for InMemoryKv {
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: ttl.map(|d| Instant::now() + d),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at.map(|at| Instant::now() < at).unwrap_or(true) => {
                Ok(Some(entry.value.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .keys()
            .filter(|k| matches_pattern(pattern, k))
            .cloned()
            .collect())
    }

    async fn publish(&self, channel: &str, message: &str) -> Result<(), StoreError> {
        // No subscribers is not an error: matches a real pub/sub backend,
        // which also drops messages with no listeners.
        let _ = self.channel(channel).send(message.to_string());
        Ok(())
    }

    fn subscribe(&self, channel: &str) -> broadcast::Receiver<String> {
        self.channel(channel).subscribe()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn get_on_missing_key_is_not_an_error() {
        let kv = InMemoryKv::new();
        assert_eq!(kv.get("nodes:n1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let kv = InMemoryKv::new();
        kv.set("nodes:n1", "hello", None).await.unwrap();
        assert_eq!(kv.get("nodes:n1").await.unwrap(), Some("hello".to_string()));
    }

    #[tokio::test]
    async fn delete_of_missing_key_is_idempotent() {
        let kv = InMemoryKv::new();
        kv.del("nodes:n1").await.unwrap();
        kv.del("nodes:n1").await.unwrap();
    }

    #[tokio::test]
    async fn keys_wildcard_scans_prefix() {
        let kv = InMemoryKv::new();
        kv.set("pods:default:a", "1", None).await.unwrap();
        kv.set("pods:default:b", "2", None).await.unwrap();
        kv.set("pods:kube-system:c", "3", None).await.unwrap();
        let mut found = kv.keys("pods:default:*").await.unwrap();
        found.sort();
        assert_eq!(found, vec!["pods:default:a", "pods:default:b"]);
    }

    #[tokio::test]
    async fn publish_reaches_subscriber() {
        let kv = InMemoryKv::new();
        let mut rx = kv.subscribe("pods:events");
        kv.publish("pods:events", "create:default/nginx").await.unwrap();
        let msg = rx.recv().await.unwrap();
        assert_eq!(msg, "create:default/nginx");
    }

    #[tokio::test]
    async fn ttl_expiry_hides_value() {
        let kv = InMemoryKv::new();
        kv.set("k", "v", Some(Duration::from_millis(10))).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(kv.get("k").await.unwrap(), None);
    }
}
