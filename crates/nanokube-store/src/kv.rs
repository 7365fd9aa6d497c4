//! The KV contract, per spec.md §6: `Set`/`Get`/`Del`/`Keys`/`Publish`/
//! `Subscribe`, string values, `*`-wildcard-suffix pattern matching.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::StoreError;

#[async_trait]
pub trait Kv: Send + Sync {
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Missing key is not an error: returns `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Idempotent: deleting an absent key is a success.
    async fn del(&self, key: &str) -> Result<(), StoreError>;

    /// `pattern` supports a trailing `*` wildcard (e.g. `pods:default:*`).
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;

    async fn publish(&self, channel: &str, message: &str) -> Result<(), StoreError>;

    /// Returns a receiver that observes messages published to `channel`
    /// from the moment of the call onward (no history replay), matching
    /// the fire-and-forget pub/sub contract of spec.md §6.
    fn subscribe(&self, channel: &str) -> broadcast::Receiver<String>;
}

pub(crate) fn matches_pattern(pattern: &str, key: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => pattern == key,
    }
}
